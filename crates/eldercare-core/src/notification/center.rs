use super::{Delivery, NotificationFeed, NotificationKind, NotificationRecord};
use crate::error::Result;

/// Feed plus delivery: publishing appends to the feed and, when the
/// platform allows it, shows the notification outside the app too.
pub struct NotificationCenter {
    pub feed: NotificationFeed,
    pub delivery: Delivery,
}

impl NotificationCenter {
    pub fn new(feed: NotificationFeed, delivery: Delivery) -> Self {
        Self { feed, delivery }
    }

    pub fn publish(&mut self, notification: NotificationRecord) -> Result<()> {
        let (title, message) = (notification.title.clone(), notification.message.clone());
        self.feed.add(notification)?;
        self.delivery.send(&title, &message);
        Ok(())
    }

    /// Create and publish a manual notification, returning its id.
    pub fn create(&mut self, title: &str, message: &str, kind: NotificationKind) -> Result<String> {
        let notification = NotificationRecord::new(kind, title, message);
        let id = notification.id.clone();
        self.publish(notification)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{MemorySink, Permission};
    use crate::storage::StateStore;

    #[test]
    fn create_adds_to_feed_and_delivers() {
        let state = StateStore::in_memory().unwrap();
        let sink = MemorySink::new(Permission::Granted);
        let delivered = sink.delivered();
        let mut delivery = Delivery::new(Box::new(sink), state.clone(), true, "");
        delivery.request_permission();
        let mut center = NotificationCenter::new(NotificationFeed::load(state).unwrap(), delivery);

        let id = center.create("Aviso", "Visita da família às 16h", NotificationKind::Info).unwrap();
        assert_eq!(center.feed.items()[0].id, id);
        assert_eq!(center.feed.unread_count(), 1);
        assert_eq!(delivered.borrow().len(), 1);
    }
}
