//! Transient user-facing messages ("toasts").
//!
//! Stores and services report outcomes through a [`Notifier`] they are
//! handed at construction. Front ends decide how to show them.

use std::cell::RefCell;

/// Severity of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Receiver of transient user-facing messages.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Routes messages into the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::error!(target: "eldercare::notice", "{message}"),
            NoticeLevel::Warning => tracing::warn!(target: "eldercare::notice", "{message}"),
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(target: "eldercare::notice", "{message}")
            }
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(NoticeLevel, String)> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.messages.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_forward_level() {
        let n = RecordingNotifier::new();
        n.success("ok");
        n.warning("careful");
        assert_eq!(
            n.messages(),
            vec![
                (NoticeLevel::Success, "ok".to_string()),
                (NoticeLevel::Warning, "careful".to_string()),
            ]
        );
    }
}
