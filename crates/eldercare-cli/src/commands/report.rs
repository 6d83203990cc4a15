//! Care reports and CSV export.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use eldercare_core::{clock, report};

use super::{open_app, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportKind {
    Events,
    Medications,
}

impl ExportKind {
    fn file_prefix(self) -> &'static str {
        match self {
            ExportKind::Events => "eventos",
            ExportKind::Medications => "medicamentos",
        }
    }
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Event counts by category and day, with medication adherence
    Summary {
        /// First day, YYYY-MM-DD (default: 30 days ago)
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,
    },
    /// Export events or medication adherence as CSV
    Csv {
        #[arg(value_enum)]
        kind: ExportKind,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Write into this directory under the standard file name
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: ReportAction) -> CliResult {
    let app = open_app()?;
    let today = clock::today_local();

    let range = |start: Option<String>, end: Option<String>| -> Result<_, Box<dyn std::error::Error>> {
        let (default_start, default_end) = report::default_range(today);
        let start = match start {
            Some(s) => clock::parse_date("start", &s)?,
            None => default_start,
        };
        let end = match end {
            Some(e) => clock::parse_date("end", &e)?,
            None => default_end,
        };
        Ok((start, end))
    };

    match action {
        ReportAction::Summary { start, end } => {
            let (start, end) = range(start, end)?;
            print_json(&app.report(start, end)?)?;
        }
        ReportAction::Csv {
            kind,
            start,
            end,
            output,
        } => {
            let (start, end) = range(start, end)?;
            let summary = app.report(start, end)?;
            let csv = match kind {
                ExportKind::Events => report::events_csv(summary.events()),
                ExportKind::Medications => report::adherence_csv(&summary.adherence),
            };
            match output {
                Some(dir) => {
                    let person = app.profile.profile().map(|p| p.name.as_str());
                    let path = dir.join(report::export_filename(kind.file_prefix(), person, today));
                    std::fs::write(&path, csv)?;
                    println!("{}", path.display());
                }
                None => print!("{csv}"),
            }
        }
    }
    Ok(())
}
