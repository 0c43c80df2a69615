//! Message transport for relay-driven signing sessions

use crate::Result;
use serde::{de::DeserializeOwned, Serialize};

pub use ::async_trait::async_trait;

/// Broadcast board shared by the participants of a session
#[async_trait]
pub trait Relay: Send + Sync {
    /// Publish a message to every participant of `session_id`
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &str,
        round: u32,
        message: &T,
    ) -> Result<()>;

    /// Wait until `count` messages were broadcast for the round and return
    /// them in arrival order
    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &str,
        round: u32,
        count: usize,
    ) -> Result<Vec<T>>;
}

/// In-memory relay for testing
pub mod memory;

pub use memory::MemoryRelay;
