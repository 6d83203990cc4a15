//! Typed JSON entries on top of [`Database`].
//!
//! Each piece of client state lives under a fixed key as a JSON document.
//! A document that no longer decodes is dropped and reported as absent so
//! the application keeps running with an empty value.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::database::{Database, Scope};
use crate::error::StorageError;

/// Fixed keys of the persisted client state.
pub mod keys {
    pub const CURRENT_USER: &str = "currentUser";
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    pub const REMEMBER_ME: &str = "rememberMe";
    pub const TOKEN: &str = "token";
    pub const MEDICATIONS: &str = "medications";
    pub const MEDICATION_HISTORY: &str = "medicationHistory";
    pub const EVENTS: &str = "events";
    pub const ELDERLY_DATA: &str = "elderlyData";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const EMERGENCY_CUSTOM_NUMBERS: &str = "emergencyCustomNumbers";
    pub const NOTIFICATION_PERMISSION: &str = "notificationPermission";
    pub const FIRED_REMINDERS: &str = "firedReminders";
}

/// Shared handle to the client-state database.
///
/// All clones write to the same connection. The handle is `!Send`: state
/// has a single owner on a single thread.
#[derive(Clone)]
pub struct StateStore {
    db: Rc<Database>,
}

impl StateStore {
    pub fn new(db: Database) -> Self {
        Self { db: Rc::new(db) }
    }

    /// In-memory store, for tests and dry runs.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Load and decode a persistent entry.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.load_in(Scope::Persistent, key)
    }

    /// Load and decode an entry; a corrupted document is removed and `None` returned.
    pub fn load_in<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.db.get(scope, key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "clearing corrupted entry");
                self.db.remove(scope, key)?;
                Ok(None)
            }
        }
    }

    /// Load a persistent entry, falling back to `T::default()`.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StorageError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Load and decode without clearing on failure.
    ///
    /// Used where a corrupted entry has consequences beyond itself
    /// (e.g. the signed-in user) and the caller must react.
    pub fn load_strict<T: DeserializeOwned>(
        &self,
        scope: Scope,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.db.get(scope, key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupted {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Encode and write a persistent entry.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.save_in(Scope::Persistent, key, value)
    }

    pub fn save_in<T: Serialize + ?Sized>(
        &self,
        scope: Scope,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Corrupted {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.db.set(scope, key, &json)
    }

    /// Raw string entries such as flags.
    pub fn get_raw(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError> {
        self.db.get(scope, key)
    }

    pub fn set_raw(&self, scope: Scope, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.set(scope, key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(Scope::Persistent, key)
    }

    pub fn remove_in(&self, scope: Scope, key: &str) -> Result<(), StorageError> {
        self.db.remove(scope, key)
    }
}
