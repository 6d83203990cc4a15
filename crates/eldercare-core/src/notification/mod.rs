//! Notification feed, platform delivery and the glue between them.

mod center;
mod feed;
pub mod sink;

pub use center::NotificationCenter;
pub use feed::NotificationFeed;
pub use sink::{CommandSink, ConsoleSink, Delivery, DeliveryError, DeliverySink, MemorySink, Permission};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Medication,
    Event,
    #[default]
    Info,
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medication" => Ok(Self::Medication),
            "event" => Ok(Self::Event),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown notification type: {other}")),
        }
    }
}

/// Reference back to the record that triggered a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationData {
    #[serde(rename_all = "camelCase")]
    Medication {
        medication_id: String,
        medication_name: String,
    },
    #[serde(rename_all = "camelCase")]
    Event { event_id: String, event_title: String },
}

/// One entry of the notification feed. Only `read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(alias = "time")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

impl NotificationRecord {
    /// Fresh unread record with a new id, stamped now.
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            data: None,
        }
    }

    pub fn with_data(mut self, data: NotificationData) -> Self {
        self.data = Some(data);
        self
    }
}
