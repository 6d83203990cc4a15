//! Reminder scheduler commands.

use chrono::NaiveDateTime;
use clap::Subcommand;
use eldercare_core::{clock, ReminderScheduler};
use tokio::sync::watch;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Evaluate reminders once and publish what is due
    Tick {
        /// Evaluate at this local time instead of now, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: Option<String>,
    },
    /// Keep evaluating reminders until interrupted (Ctrl-C)
    Run,
}

fn parse_at(value: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M"))
        .map_err(|_| format!("invalid time '{value}': expected \"YYYY-MM-DD HH:MM\"").into())
}

pub async fn run(action: RemindAction) -> CliResult {
    let mut app = open_app()?;
    app.notifications.delivery.request_permission();
    let mut scheduler = ReminderScheduler::from_config(&app.config, app.state.clone())?;

    match action {
        RemindAction::Tick { at } => {
            let now = match at {
                Some(at) => parse_at(&at)?,
                None => clock::now_local(),
            };
            let fired = scheduler.tick(&mut app, now)?;
            print_json(&fired)?;
        }
        RemindAction::Run => {
            let (tx, rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = tx.send(true);
                }
            });
            eprintln!(
                "checking reminders every {}s, Ctrl-C to stop",
                scheduler.interval().as_secs()
            );
            scheduler.run(&mut app, rx).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_at_accepts_space_or_t() {
        let a = parse_at("2026-10-15 07:00").unwrap();
        let b = parse_at("2026-10-15T07:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_at("07:00").is_err());
    }
}
