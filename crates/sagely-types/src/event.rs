//! Push-channel event decoding.
//!
//! Inbound frames are JSON objects tagged by an `rpc` discriminator. Only
//! the variants below are recognized; anything else fails to decode and is
//! logged and dropped by the channel manager rather than crashing it.

use serde::{Deserialize, Serialize};

use crate::learning::LearningTarget;
use crate::message::Message;

/// Session state piggybacked on a channel event.
///
/// `is_busy: false` signals that the assistant is no longer composing a
/// reply and clears the thinking indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHint {
    #[serde(default)]
    pub is_busy: Option<bool>,
}

/// A recognized inbound event from the push channel.
///
/// Every variant may carry a [`SessionHint`]; the busy flag is honored
/// regardless of which event kind delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rpc")]
pub enum ChannelEvent {
    /// A new message was appended to the session.
    #[serde(rename = "addMessage")]
    MessageAppended {
        message: Message,
        #[serde(default)]
        session: Option<SessionHint>,
    },

    /// A new learning target was created.
    #[serde(rename = "addSessionTopic")]
    TopicCreated {
        topic: LearningTarget,
        #[serde(default)]
        session: Option<SessionHint>,
    },

    /// An existing learning target's proficiency changed.
    #[serde(rename = "updateSessionTopic")]
    TopicUpdated {
        topic: LearningTarget,
        #[serde(default)]
        session: Option<SessionHint>,
    },
}

impl ChannelEvent {
    /// The embedded busy flag, when the event carries one.
    pub fn busy_hint(&self) -> Option<bool> {
        let hint = match self {
            ChannelEvent::MessageAppended { session, .. }
            | ChannelEvent::TopicCreated { session, .. }
            | ChannelEvent::TopicUpdated { session, .. } => session,
        };
        hint.as_ref().and_then(|h| h.is_busy)
    }
}
