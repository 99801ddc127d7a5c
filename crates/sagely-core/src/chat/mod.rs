//! Conversation state, event merging, and the send path.

pub mod service;
pub mod state;
pub mod update;

pub use service::ChatService;
pub use state::SharedState;
pub use update::{ChatUpdate, UpdateBus};
