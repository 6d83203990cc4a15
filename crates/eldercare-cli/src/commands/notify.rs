//! Notification feed commands.

use clap::Subcommand;
use eldercare_core::notification::NotificationKind;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification read
    ReadAll,
    /// Remove one notification
    Remove {
        /// Notification ID
        id: String,
    },
    /// Remove every notification
    Clear,
    /// Publish a notification by hand
    Create {
        title: String,
        message: String,
        /// medication, event or info
        #[arg(long, default_value = "info")]
        kind: NotificationKind,
    },
    /// Show or change the platform notification permission
    Permission {
        /// Ask the platform if not asked yet
        #[arg(long, conflicts_with = "reset")]
        request: bool,
        /// Forget the recorded answer
        #[arg(long)]
        reset: bool,
    },
}

pub fn run(action: NotifyAction) -> CliResult {
    let mut app = open_app()?;
    let center = &mut app.notifications;

    match action {
        NotifyAction::List { unread } => {
            let items: Vec<_> = center
                .feed
                .items()
                .iter()
                .filter(|n| !unread || !n.read)
                .collect();
            print_json(&items)?;
        }
        NotifyAction::Read { id } => {
            if center.feed.get(&id).is_none() {
                return Err(format!("Notification not found: {id}").into());
            }
            center.feed.mark_read(&id)?;
            println!("unread: {}", center.feed.unread_count());
        }
        NotifyAction::ReadAll => {
            center.feed.mark_all_read()?;
            println!("unread: 0");
        }
        NotifyAction::Remove { id } => match center.feed.remove(&id)? {
            Some(_) => println!("Notification removed: {id}"),
            None => return Err(format!("Notification not found: {id}").into()),
        },
        NotifyAction::Clear => {
            center.feed.clear()?;
            println!("notifications cleared");
        }
        NotifyAction::Create { title, message, kind } => {
            let id = center.create(&title, &message, kind)?;
            println!("{id}");
        }
        NotifyAction::Permission { request, reset } => {
            if reset {
                center.delivery.reset_permission();
            } else if request {
                center.delivery.request_permission();
            }
            print_json(&serde_json::json!({
                "sink": center.delivery.sink_name(),
                "permission": center.delivery.permission().to_string(),
            }))?;
        }
    }
    Ok(())
}
