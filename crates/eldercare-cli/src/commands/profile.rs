//! Cared-for person's profile.

use clap::Subcommand;
use eldercare_core::profile::ProfilePatch;

use super::{open_app, print_json, split_list, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the stored profile
    Show,
    /// Change profile fields (lists are comma-separated)
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        blood_type: Option<String>,
        #[arg(long)]
        marital_status: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        emergency_contact: Option<String>,
        #[arg(long)]
        conditions: Option<String>,
        #[arg(long)]
        medications: Option<String>,
    },
    /// Download the profile from the backend
    Fetch,
    /// Upload the stored profile to the backend
    Push,
}

pub async fn run(action: ProfileAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        ProfileAction::Show => match app.profile.profile() {
            Some(profile) => print_json(profile)?,
            None => println!("no profile"),
        },
        ProfileAction::Update {
            name,
            age,
            birth_date,
            blood_type,
            marital_status,
            allergies,
            address,
            phone,
            emergency_contact,
            conditions,
            medications,
        } => {
            let patch = ProfilePatch {
                name,
                age,
                birth_date,
                blood_type,
                marital_status,
                allergies: allergies.as_deref().map(split_list),
                address,
                phone,
                emergency_contact,
                medical_conditions: conditions.as_deref().map(split_list),
                medications: medications.as_deref().map(split_list),
            };
            let profile = app.profile.update(patch)?;
            print_json(&profile)?;
        }
        ProfileAction::Fetch => {
            let profile = app.fetch_profile().await?;
            print_json(&profile)?;
        }
        ProfileAction::Push => {
            let profile = app.push_profile().await?;
            print_json(&profile)?;
        }
    }
    Ok(())
}
