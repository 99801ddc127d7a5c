//! Broadcast bus for state-change notifications.
//!
//! Built on `tokio::sync::broadcast`. Every mutation of the shared
//! conversation state publishes exactly one update per visual effect, so a
//! consumer rendering from the bus shows each event at most once no matter
//! whether it arrived via the bootstrap fetch, the push channel, or the
//! send path.

use tokio::sync::broadcast;

use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;

/// A single observable change to the conversation state.
#[derive(Debug, Clone)]
pub enum ChatUpdate {
    MessageAppended(Message),
    TargetAdded(LearningTarget),
    TargetUpdated(LearningTarget),
    LessonRecorded(Lesson),
    WisdomPoints(u32),
    Thinking(bool),
}

/// Multi-consumer bus for [`ChatUpdate`] values.
///
/// Publishing with no subscribers is a no-op. Cloning shares the channel.
pub struct UpdateBus {
    sender: broadcast::Sender<ChatUpdate>,
}

impl UpdateBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// New subscriber receiving all future updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.sender.subscribe()
    }

    /// Publish an update to all current subscribers.
    pub fn publish(&self, update: ChatUpdate) {
        let _ = self.sender.send(update);
    }
}

impl Clone for UpdateBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for UpdateBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = UpdateBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ChatUpdate::Thinking(true));

        assert!(matches!(rx1.recv().await.unwrap(), ChatUpdate::Thinking(true)));
        assert!(matches!(rx2.recv().await.unwrap(), ChatUpdate::Thinking(true)));
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = UpdateBus::new(4);
        bus.publish(ChatUpdate::WisdomPoints(10));
        bus.publish(ChatUpdate::Thinking(false));
    }
}
