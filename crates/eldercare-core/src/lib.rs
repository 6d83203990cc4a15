//! # Eldercare Core Library
//!
//! Business logic for a caregiver's assistant: medication schedules, a
//! calendar of appointments, and the reminders that come out of both.
//! Everything is available through the `eldercare` CLI; front ends are thin
//! layers over this crate.
//!
//! ## Architecture
//!
//! - **Stores**: medications, intake history and events, persisted as JSON
//!   documents in a small SQLite key-value database
//! - **Reminders**: a pure evaluator over the local wall clock, driven by a
//!   periodic scheduler
//! - **Notifications**: an in-app feed plus best-effort platform delivery
//! - **Backend**: REST client for authentication and the elderly profile
//!
//! ## Key Components
//!
//! - [`App`]: the single application state object
//! - [`ReminderScheduler`]: tick loop publishing due reminders
//! - [`NotificationFeed`]: the user-visible notification list
//! - [`Config`]: application configuration management

pub mod api;
pub mod app;
pub mod auth;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod medication;
pub mod notice;
pub mod notification;
pub mod profile;
pub mod reminder;
pub mod report;
pub mod storage;

pub use api::ApiClient;
pub use app::App;
pub use auth::{AuthSession, Role, User};
pub use calendar::{EventRecord, EventStore};
pub use error::{ApiError, ConfigError, CoreError, StorageError, ValidationError};
pub use medication::{MedicationHistoryRecord, MedicationRecord, MedicationStore};
pub use notice::{LogNotifier, NoticeLevel, Notifier};
pub use notification::{NotificationFeed, NotificationKind, NotificationRecord};
pub use reminder::{ReminderEvaluator, ReminderScheduler};
pub use storage::{Config, Database, StateStore};
