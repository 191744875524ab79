// Events that flow from background tasks to the TUI
//
// Network sends run on spawned tasks; their outcomes come back through an
// mpsc channel and are applied on the UI task. Connectivity snapshots travel
// separately through the watcher's watch channel.

use crate::api::{ApiError, ChatReply};
use crate::catalog::TopicId;

/// Main event type delivered to the TUI event loop
#[derive(Debug)]
pub enum AppEvent {
    /// A dispatched message settled (success or failure)
    Reply {
        topic: TopicId,
        /// Session generation the request was dispatched under; stale
        /// generations are discarded by the session
        generation: u64,
        result: Result<ChatReply, ApiError>,
    },
}
