use tokio::sync::broadcast;

use crate::events::DataUpdated;

const CHANNEL_CAPACITY: usize = 16;

/// Broadcast of payload-free "data updated" notifications.
///
/// Views subscribe and refetch or recompute when one arrives. A lagging
/// subscriber only misses duplicates, since the notification carries no data.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<DataUpdated>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataUpdated> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers reached. Zero is not an error.
    pub fn notify(&self) -> usize {
        self.tx.send(DataUpdated).unwrap_or(0)
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_subscribers_is_fine() {
        let bus = NotificationBus::new();
        assert_eq!(bus.notify(), 0);
    }

    #[test]
    fn subscribers_receive_notifications() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe();
        assert_eq!(bus.notify(), 1);
        assert_eq!(rx.try_recv().unwrap(), DataUpdated);
        assert!(rx.try_recv().is_err());
    }
}
