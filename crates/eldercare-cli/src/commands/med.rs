//! Medication commands.

use clap::{Subcommand, ValueEnum};
use eldercare_core::clock;
use eldercare_core::medication::{MedicationImportRow, MedicationPatch, MedicationStatus, NewMedication};

use super::{date_or_today, open_app, print_json, read_rows, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for MedicationStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Active => MedicationStatus::Active,
            StatusArg::Inactive => MedicationStatus::Inactive,
        }
    }
}

#[derive(Subcommand)]
pub enum MedAction {
    /// Add a medication
    Add {
        /// Medication name
        name: String,
        /// Dosage (e.g. "500mg")
        #[arg(long)]
        dosage: String,
        /// Daily dose time, HH:MM
        #[arg(long)]
        time: String,
        /// First day, YYYY-MM-DD (default: today)
        #[arg(long)]
        start_date: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long, default_value = "")]
        frequency: String,
        #[arg(long, default_value = "")]
        instructions: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List medications
    List {
        /// Only active medications, sorted by name
        #[arg(long)]
        active: bool,
    },
    /// Medications scheduled for a day
    Today {
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Update a medication
    Update {
        /// Medication ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        /// Empty string clears the end date
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long)]
        reminders: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a medication
    Delete {
        /// Medication ID
        id: String,
    },
    /// Record a dose
    Take {
        /// Medication ID
        id: String,
        /// Record the dose as missed
        #[arg(long)]
        missed: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Intake history, newest first
    History {
        /// Only this medication
        id: Option<String>,
    },
    /// Import medications from a JSON array of rows ("-" for stdin)
    Import {
        file: String,
    },
}

pub fn run(action: MedAction) -> CliResult {
    let mut app = open_app()?;
    let meds = &mut app.medications;

    match action {
        MedAction::Add {
            name,
            dosage,
            time,
            start_date,
            end_date,
            frequency,
            instructions,
            notes,
        } => {
            let start_date = start_date.unwrap_or_else(|| clock::format_date(clock::today_local()));
            let record = meds.add(NewMedication {
                name,
                dosage,
                frequency,
                time,
                start_date,
                end_date,
                instructions,
                notes,
            })?;
            print_json(&record)?;
        }
        MedAction::List { active } => {
            if active {
                print_json(&meds.active())?;
            } else {
                print_json(meds.all())?;
            }
        }
        MedAction::Today { date } => {
            let day = date_or_today(date.as_deref())?;
            print_json(&meds.for_day(day))?;
        }
        MedAction::Update {
            id,
            name,
            dosage,
            time,
            frequency,
            start_date,
            end_date,
            status,
            instructions,
            reminders,
            notes,
        } => {
            let record = meds.update(
                &id,
                MedicationPatch {
                    name,
                    dosage,
                    frequency,
                    time,
                    start_date,
                    end_date,
                    status: status.map(Into::into),
                    instructions,
                    reminders,
                    notes,
                },
            )?;
            print_json(&record)?;
        }
        MedAction::Delete { id } => match meds.delete(&id)? {
            Some(_) => println!("Medication deleted: {id}"),
            None => return Err(format!("Medication not found: {id}").into()),
        },
        MedAction::Take { id, missed, notes } => {
            let entry = meds.record_taken(&id, !missed, &notes)?;
            print_json(&entry)?;
        }
        MedAction::History { id } => match id {
            Some(id) => print_json(&meds.history_for(&id))?,
            None => {
                let mut all = meds.history().to_vec();
                all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                print_json(&all)?;
            }
        },
        MedAction::Import { file } => {
            let rows: Vec<MedicationImportRow> = read_rows(&file)?;
            let imported = meds.import(rows, clock::today_local())?;
            print_json(&imported)?;
        }
    }
    Ok(())
}
