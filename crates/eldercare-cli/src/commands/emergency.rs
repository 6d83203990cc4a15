//! Emergency phone directory.

use clap::Subcommand;
use eldercare_core::profile::NewCustomNumber;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum EmergencyAction {
    /// Services, the profile's contact and custom numbers
    List,
    /// Add a custom number
    Add {
        name: String,
        phone: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove a custom number
    Remove {
        /// Custom number ID
        id: String,
    },
}

pub fn run(action: EmergencyAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        EmergencyAction::List => {
            print_json(&serde_json::json!({
                "directory": app.emergency_directory(),
                "custom": app.emergency.custom(),
            }))?;
        }
        EmergencyAction::Add {
            name,
            phone,
            description,
        } => {
            let number = app.emergency.add(NewCustomNumber {
                name,
                phone,
                description,
            })?;
            print_json(&number)?;
        }
        EmergencyAction::Remove { id } => match app.emergency.remove(&id)? {
            Some(_) => println!("Number removed: {id}"),
            None => return Err(format!("Number not found: {id}").into()),
        },
    }
    Ok(())
}
