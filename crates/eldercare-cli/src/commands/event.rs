//! Calendar event commands.

use clap::Subcommand;
use eldercare_core::calendar::{EventImportRow, EventPatch, NewEvent};
use eldercare_core::clock;

use super::{date_or_today, open_app, print_json, read_rows, CliResult};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add an event
    Add {
        /// Event title
        title: String,
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Start time, HH:MM
        #[arg(long)]
        start: String,
        /// End time, HH:MM
        #[arg(long, default_value = "")]
        end: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Category (default: "Outro")
        #[arg(long)]
        category: Option<String>,
    },
    /// List events
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Events on a day, by start time
    Today {
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Events between two days, inclusive
    Range {
        /// First day, YYYY-MM-DD
        start: String,
        /// Last day, YYYY-MM-DD
        end: String,
    },
    /// Update an event
    Update {
        /// Event ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
    /// Import events from a JSON array of rows ("-" for stdin)
    Import {
        file: String,
    },
}

pub fn run(action: EventAction) -> CliResult {
    let mut app = open_app()?;
    let events = &mut app.events;

    match action {
        EventAction::Add {
            title,
            date,
            start,
            end,
            location,
            description,
            category,
        } => {
            let date = date.unwrap_or_else(|| clock::format_date(clock::today_local()));
            let event = events.add(NewEvent {
                title,
                date,
                start_time: start,
                end_time: end,
                location,
                description,
                category,
            })?;
            print_json(&event)?;
        }
        EventAction::List { category } => match category {
            Some(c) => print_json(&events.by_category(&c))?,
            None => print_json(events.all())?,
        },
        EventAction::Today { date } => {
            let day = date_or_today(date.as_deref())?;
            print_json(&events.for_day(day))?;
        }
        EventAction::Range { start, end } => {
            let start = clock::parse_date("start", &start)?;
            let end = clock::parse_date("end", &end)?;
            print_json(&events.in_range(start, end))?;
        }
        EventAction::Update {
            id,
            title,
            date,
            start,
            end,
            location,
            description,
            category,
        } => {
            let event = events.update(
                &id,
                EventPatch {
                    title,
                    date,
                    start_time: start,
                    end_time: end,
                    location,
                    description,
                    category,
                },
            )?;
            print_json(&event)?;
        }
        EventAction::Delete { id } => match events.delete(&id)? {
            Some(_) => println!("Event deleted: {id}"),
            None => return Err(format!("Event not found: {id}").into()),
        },
        EventAction::Import { file } => {
            let rows: Vec<EventImportRow> = read_rows(&file)?;
            let imported = events.import(rows, clock::today_local())?;
            print_json(&imported)?;
        }
    }
    Ok(())
}
