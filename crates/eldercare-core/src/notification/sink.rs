//! Platform notification delivery.
//!
//! A [`DeliverySink`] talks to whatever shows notifications outside the
//! application. [`Delivery`] wraps one with the permission gate and the
//! fire-and-forget policy: a failed send is logged and dropped.

use std::cell::RefCell;
use std::io;
use std::process::{Command, Stdio};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{keys, StateStore};

/// Platform permission to show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: String },

    #[error("{0}")]
    Rejected(String),
}

/// Something that can show a notification outside the application.
pub trait DeliverySink {
    fn name(&self) -> &str;

    /// Permission the platform reports without prompting.
    fn query_permission(&self) -> Permission;

    /// Prompt the platform (or probe it) for permission.
    fn request_permission(&mut self) -> Permission;

    /// Show one notification.
    fn show(&self, title: &str, body: &str, icon: &str) -> Result<(), DeliveryError>;
}

/// Desktop notifications through a `notify-send` compatible program.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
}

impl CommandSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DeliverySink for CommandSink {
    fn name(&self) -> &str {
        &self.program
    }

    fn query_permission(&self) -> Permission {
        Permission::Default
    }

    /// Granted when the program can be launched at all.
    fn request_permission(&mut self) -> Permission {
        let probe = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match probe {
            Ok(_) => Permission::Granted,
            Err(e) => {
                tracing::info!(program = %self.program, error = %e, "notification program unavailable");
                Permission::Denied
            }
        }
    }

    fn show(&self, title: &str, body: &str, icon: &str) -> Result<(), DeliveryError> {
        let mut cmd = Command::new(&self.program);
        if !icon.is_empty() {
            cmd.arg("-i").arg(icon);
        }
        let status = cmd
            .arg(title)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| DeliveryError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(DeliveryError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Writes notifications to stderr. Always permitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DeliverySink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn query_permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show(&self, title: &str, body: &str, _icon: &str) -> Result<(), DeliveryError> {
        eprintln!("[{title}] {body}");
        Ok(())
    }
}

/// Keeps deliveries in memory; the platform answer and failures are scripted.
#[derive(Debug, Clone)]
pub struct MemorySink {
    answer: Permission,
    fail: bool,
    delivered: Rc<RefCell<Vec<(String, String)>>>,
}

impl MemorySink {
    /// A sink whose permission prompt answers `answer`.
    pub fn new(answer: Permission) -> Self {
        Self {
            answer,
            fail: false,
            delivered: Rc::default(),
        }
    }

    /// A sink that accepts the permission prompt but fails every send.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Permission::Granted)
        }
    }

    /// Shared view of what was delivered, usable after the sink is boxed.
    pub fn delivered(&self) -> Rc<RefCell<Vec<(String, String)>>> {
        Rc::clone(&self.delivered)
    }
}

impl DeliverySink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn query_permission(&self) -> Permission {
        Permission::Default
    }

    fn request_permission(&mut self) -> Permission {
        self.answer
    }

    fn show(&self, title: &str, body: &str, _icon: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected("scripted failure".into()));
        }
        self.delivered
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Permission-gated, best-effort delivery.
pub struct Delivery {
    sink: Box<dyn DeliverySink>,
    state: StateStore,
    permission: Permission,
    enabled: bool,
    icon: String,
}

impl Delivery {
    /// Wrap a sink. A permission decided earlier is restored from storage.
    pub fn new(sink: Box<dyn DeliverySink>, state: StateStore, enabled: bool, icon: impl Into<String>) -> Self {
        let stored = state
            .load::<Permission>(keys::NOTIFICATION_PERMISSION)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read notification permission");
                None
            });
        let permission = stored.unwrap_or_else(|| sink.query_permission());
        Self {
            sink,
            state,
            permission,
            enabled,
            icon: icon.into(),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Ask the platform once. Later calls return the recorded answer.
    pub fn request_permission(&mut self) -> bool {
        if self.permission == Permission::Default {
            self.permission = self.sink.request_permission();
            if let Err(e) = self
                .state
                .save(keys::NOTIFICATION_PERMISSION, &self.permission)
            {
                tracing::warn!(error = %e, "could not persist notification permission");
            }
            tracing::info!(sink = self.sink.name(), permission = %self.permission, "notification permission requested");
        }
        self.permission == Permission::Granted
    }

    /// Forget the recorded answer so the next request prompts again.
    pub fn reset_permission(&mut self) {
        self.permission = self.sink.query_permission();
        if let Err(e) = self.state.remove(keys::NOTIFICATION_PERMISSION) {
            tracing::warn!(error = %e, "could not clear notification permission");
        }
    }

    /// Show a notification if permitted. Never fails; errors are logged.
    pub fn send(&self, title: &str, message: &str) {
        if !self.enabled || self.permission != Permission::Granted {
            return;
        }
        if let Err(e) = self.sink.show(title, message, &self.icon) {
            tracing::warn!(sink = self.sink.name(), error = %e, "failed to deliver notification");
        }
    }
}
