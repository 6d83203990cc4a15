//! The user-visible notification list.
//!
//! Newest first. Every mutation rewrites the whole list under
//! `notifications`; there is no size cap.

use super::NotificationRecord;
use crate::error::Result;
use crate::storage::{keys, StateStore};

pub struct NotificationFeed {
    state: StateStore,
    items: Vec<NotificationRecord>,
}

impl NotificationFeed {
    pub fn load(state: StateStore) -> Result<Self> {
        let items = state.load_or_default(keys::NOTIFICATIONS)?;
        Ok(Self { state, items })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.items = self.state.load_or_default(keys::NOTIFICATIONS)?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.state.save(keys::NOTIFICATIONS, &self.items)?;
        Ok(())
    }

    pub fn items(&self) -> &[NotificationRecord] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&NotificationRecord> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Prepend a record.
    pub fn add(&mut self, notification: NotificationRecord) -> Result<()> {
        self.items.insert(0, notification);
        self.persist()
    }

    /// Mark one record read. Returns whether anything changed.
    pub fn mark_read(&mut self, id: &str) -> Result<bool> {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                self.persist()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn mark_all_read(&mut self) -> Result<()> {
        for n in &mut self.items {
            n.read = true;
        }
        self.persist()
    }

    /// Remove one record. Unknown ids leave the feed untouched.
    pub fn remove(&mut self, id: &str) -> Result<Option<NotificationRecord>> {
        let Some(idx) = self.items.iter().position(|n| n.id == id) else {
            return Ok(None);
        };
        let removed = self.items.remove(idx);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persist()
    }
}
