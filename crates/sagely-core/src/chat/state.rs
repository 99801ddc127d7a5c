//! Conversation state and the event merger.
//!
//! [`ChatState`] is the pure state-transition half: it applies validated
//! events and reports which visual effects they produced. [`SharedState`]
//! wraps it for concurrent use: every mutation takes the lock, mutates, and
//! publishes in one synchronous block -- never across an await -- so each
//! change is atomic from the perspective of a single event-loop turn.

use std::sync::{Arc, Mutex};

use sagely_types::event::ChannelEvent;
use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;

use super::update::{ChatUpdate, UpdateBus};

/// Capacity of the update broadcast channel.
const UPDATE_BUS_CAPACITY: usize = 256;

/// In-memory conversation state for one activation.
///
/// Messages are append-only in arrival order; targets are unique by id;
/// lessons are newest-first.
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    targets: Vec<LearningTarget>,
    lessons: Vec<Lesson>,
    wisdom_points: u32,
    thinking: bool,
}

impl ChatState {
    /// Apply one validated channel event, returning the visual effects it
    /// produced. Pure and infallible: unknown topic updates and duplicate
    /// target creations degrade to no-ops.
    pub fn apply(&mut self, event: &ChannelEvent) -> Vec<ChatUpdate> {
        let mut updates = Vec::new();

        match event {
            ChannelEvent::MessageAppended { message, .. } => {
                // Append-only, no dedup key: arrival order is display order.
                self.messages.push(message.clone());
                updates.push(ChatUpdate::MessageAppended(message.clone()));
            }
            ChannelEvent::TopicCreated { topic, .. } => {
                if self.targets.iter().any(|t| t.id == topic.id) {
                    tracing::debug!(target_id = topic.id, "duplicate target create ignored");
                } else {
                    self.targets.push(topic.clone());
                    updates.push(ChatUpdate::TargetAdded(topic.clone()));
                }
            }
            ChannelEvent::TopicUpdated { topic, .. } => {
                match self
                    .targets
                    .iter_mut()
                    .find(|t| t.topic_name == topic.topic_name)
                {
                    Some(existing) => {
                        existing.proficiency = topic.proficiency;
                        updates.push(ChatUpdate::TargetUpdated(existing.clone()));
                    }
                    None => {
                        tracing::debug!(
                            topic_name = %topic.topic_name,
                            "proficiency update for unknown target ignored"
                        );
                    }
                }
            }
        }

        if event.busy_hint() == Some(false) {
            if let Some(update) = self.set_thinking(false) {
                updates.push(update);
            }
        }

        updates
    }

    /// Splice REST-fetched history in front of anything the channel
    /// delivered while the fetch was in flight, preserving arrival order
    /// within both halves.
    pub fn hydrate_messages(&mut self, mut history: Vec<Message>) {
        let live = std::mem::take(&mut self.messages);
        history.extend(live);
        self.messages = history;
    }

    /// Hydrate targets from REST, keeping channel-created targets whose id
    /// the fetched list does not already carry.
    pub fn hydrate_targets(&mut self, fetched: Vec<LearningTarget>) {
        let live = std::mem::take(&mut self.targets);
        self.targets = fetched;
        for target in live {
            if !self.targets.iter().any(|t| t.id == target.id) {
                self.targets.push(target);
            }
        }
    }

    /// Hydrate lessons from REST; lessons recorded before hydration settled
    /// stay at the front (newest-first).
    pub fn hydrate_lessons(&mut self, fetched: Vec<Lesson>) {
        self.lessons.extend(fetched);
    }

    pub fn append_message(&mut self, message: Message) -> ChatUpdate {
        self.messages.push(message.clone());
        ChatUpdate::MessageAppended(message)
    }

    pub fn record_lesson(&mut self, lesson: Lesson) -> ChatUpdate {
        self.lessons.insert(0, lesson.clone());
        ChatUpdate::LessonRecorded(lesson)
    }

    pub fn set_wisdom_points(&mut self, points: u32) -> Option<ChatUpdate> {
        if self.wisdom_points == points {
            return None;
        }
        self.wisdom_points = points;
        Some(ChatUpdate::WisdomPoints(points))
    }

    pub fn add_wisdom_points(&mut self, points: u32) -> ChatUpdate {
        self.wisdom_points += points;
        ChatUpdate::WisdomPoints(self.wisdom_points)
    }

    /// Returns an update only on an actual transition.
    pub fn set_thinking(&mut self, thinking: bool) -> Option<ChatUpdate> {
        if self.thinking == thinking {
            return None;
        }
        self.thinking = thinking;
        Some(ChatUpdate::Thinking(thinking))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn targets(&self) -> &[LearningTarget] {
        &self.targets
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn wisdom_points(&self) -> u32 {
        self.wisdom_points
    }

    pub fn thinking(&self) -> bool {
        self.thinking
    }
}

/// Shared handle over [`ChatState`] plus the update bus.
///
/// Cloning shares the underlying state. All mutation goes through methods
/// that hold the lock for one synchronous block and publish the resulting
/// updates after the state is consistent.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<Inner>,
}

struct Inner {
    chat: Mutex<ChatState>,
    bus: UpdateBus,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                chat: Mutex::new(ChatState::default()),
                bus: UpdateBus::new(UPDATE_BUS_CAPACITY),
            }),
        }
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChatUpdate> {
        self.inner.bus.subscribe()
    }

    /// Apply a channel event exactly once and publish its effects.
    pub fn apply_event(&self, event: &ChannelEvent) {
        let updates = self.inner.chat.lock().expect("state lock").apply(event);
        self.publish_all(updates);
    }

    pub fn hydrate_messages(&self, history: Vec<Message>) {
        self.inner
            .chat
            .lock()
            .expect("state lock")
            .hydrate_messages(history);
    }

    pub fn hydrate_targets(&self, fetched: Vec<LearningTarget>) {
        self.inner
            .chat
            .lock()
            .expect("state lock")
            .hydrate_targets(fetched);
    }

    pub fn hydrate_lessons(&self, fetched: Vec<Lesson>) {
        self.inner
            .chat
            .lock()
            .expect("state lock")
            .hydrate_lessons(fetched);
    }

    pub fn append_message(&self, message: Message) {
        let update = self
            .inner
            .chat
            .lock()
            .expect("state lock")
            .append_message(message);
        self.inner.bus.publish(update);
    }

    pub fn record_lesson(&self, lesson: Lesson) {
        let update = self
            .inner
            .chat
            .lock()
            .expect("state lock")
            .record_lesson(lesson);
        self.inner.bus.publish(update);
    }

    pub fn set_wisdom_points(&self, points: u32) {
        let update = self
            .inner
            .chat
            .lock()
            .expect("state lock")
            .set_wisdom_points(points);
        self.publish_all(update);
    }

    pub fn add_wisdom_points(&self, points: u32) {
        let update = self
            .inner
            .chat
            .lock()
            .expect("state lock")
            .add_wisdom_points(points);
        self.inner.bus.publish(update);
    }

    pub fn set_thinking(&self, thinking: bool) {
        let update = self
            .inner
            .chat
            .lock()
            .expect("state lock")
            .set_thinking(thinking);
        self.publish_all(update);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.chat.lock().expect("state lock").messages().to_vec()
    }

    pub fn targets(&self) -> Vec<LearningTarget> {
        self.inner.chat.lock().expect("state lock").targets().to_vec()
    }

    pub fn lessons(&self) -> Vec<Lesson> {
        self.inner.chat.lock().expect("state lock").lessons().to_vec()
    }

    pub fn wisdom_points(&self) -> u32 {
        self.inner.chat.lock().expect("state lock").wisdom_points()
    }

    pub fn thinking(&self) -> bool {
        self.inner.chat.lock().expect("state lock").thinking()
    }

    fn publish_all(&self, updates: impl IntoIterator<Item = ChatUpdate>) {
        for update in updates {
            self.inner.bus.publish(update);
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chat = self.inner.chat.lock().expect("state lock");
        f.debug_struct("SharedState")
            .field("messages", &chat.messages().len())
            .field("targets", &chat.targets().len())
            .field("lessons", &chat.lessons().len())
            .field("thinking", &chat.thinking())
            .finish()
    }
}
