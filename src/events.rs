use time::Date;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A meal was created or deleted for this user on this date. Views holding a
/// computed daily summary refetch and recompute when they see one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealChange {
    pub user_id: Uuid,
    pub date: Date,
}

/// Pub/sub invalidation channel for meal changes. Fire-and-forget:
/// publishing with no subscribers is fine, and a lagging subscriber simply
/// misses events until its next full reload.
#[derive(Clone)]
pub struct MealEvents {
    sender: broadcast::Sender<MealChange>,
}

impl MealEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MealChange> {
        self.sender.subscribe()
    }

    pub fn publish(&self, change: MealChange) {
        // Err here only means nobody is listening right now.
        let _ = self.sender.send(change);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let events = MealEvents::new(16);
        let mut rx = events.subscribe();

        let change = MealChange {
            user_id: Uuid::new_v4(),
            date: date!(2025 - 06 - 01),
        };
        events.publish(change);

        assert_eq!(rx.recv().await.unwrap(), change);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let events = MealEvents::new(16);
        assert_eq!(events.subscriber_count(), 0);
        events.publish(MealChange {
            user_id: Uuid::new_v4(),
            date: date!(2025 - 06 - 01),
        });
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_change() {
        let events = MealEvents::new(16);
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        let change = MealChange {
            user_id: Uuid::new_v4(),
            date: date!(2025 - 06 - 02),
        };
        events.publish(change);

        assert_eq!(first.recv().await.unwrap(), change);
        assert_eq!(second.recv().await.unwrap(), change);
    }
}
