//! In-memory relay implementation for testing

use super::{async_trait, Relay};
use crate::{Error, Result};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_secs(30);

/// In-memory message relay for local testing
///
/// Cloning yields another handle onto the same board, so every party in a
/// test can own one.
#[derive(Clone)]
pub struct MemoryRelay {
    /// Broadcast messages: (session_id, round) -> Vec<message_bytes>
    broadcasts: Arc<DashMap<(String, u32), Vec<Vec<u8>>>>,
    /// Notification channel
    notify: broadcast::Sender<()>,
    collect_timeout: Duration,
}

impl MemoryRelay {
    /// Create a new in-memory relay
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COLLECT_TIMEOUT)
    }

    /// Relay whose `collect_broadcasts` gives up after `collect_timeout`
    pub fn with_timeout(collect_timeout: Duration) -> Self {
        let (notify, _) = broadcast::channel(100);
        Self {
            broadcasts: Arc::new(DashMap::new()),
            notify,
            collect_timeout,
        }
    }

    /// Number of messages posted so far for a round
    pub fn message_count(&self, session_id: &str, round: u32) -> usize {
        self.broadcasts
            .get(&(session_id.to_string(), round))
            .map(|messages| messages.len())
            .unwrap_or(0)
    }

    fn ready<T: DeserializeOwned>(
        &self,
        key: &(String, u32),
        count: usize,
    ) -> Option<Result<Vec<T>>> {
        let messages = self.broadcasts.get(key)?;
        if messages.len() < count {
            return None;
        }
        Some(
            messages
                .iter()
                .take(count)
                .map(|bytes| deserialize(bytes))
                .collect(),
        )
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Relay(e.to_string()))
}

fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Relay(e.to_string()))
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &str,
        round: u32,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;

        self.broadcasts
            .entry((session_id.to_string(), round))
            .or_default()
            .push(bytes);
        trace!(session_id, round, "Message posted");

        let _ = self.notify.send(());
        Ok(())
    }

    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &str,
        round: u32,
        count: usize,
    ) -> Result<Vec<T>> {
        let key = (session_id.to_string(), round);
        let mut rx = self.notify.subscribe();

        let wait = async {
            loop {
                if let Some(result) = self.ready(&key, count) {
                    return result;
                }

                tokio::select! {
                    _ = rx.recv() => continue,
                    _ = tokio::time::sleep(Duration::from_millis(100)) => continue,
                }
            }
        };

        tokio::time::timeout(self.collect_timeout, wait)
            .await
            .map_err(|_| {
                Error::Relay(format!(
                    "timed out waiting for {} messages in round {}",
                    count, round
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestMessage {
        value: u32,
    }

    #[tokio::test]
    async fn test_broadcast() {
        let relay = MemoryRelay::new();

        relay.broadcast("s", 1, &TestMessage { value: 42 }).await.unwrap();
        relay.broadcast("s", 1, &TestMessage { value: 43 }).await.unwrap();

        let messages: Vec<TestMessage> = relay.collect_broadcasts("s", 1, 2).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].value, 42);
        assert_eq!(messages[1].value, 43);
    }

    #[tokio::test]
    async fn test_rounds_and_sessions_are_separate() {
        let relay = MemoryRelay::new();

        relay.broadcast("a", 1, &TestMessage { value: 1 }).await.unwrap();
        relay.broadcast("a", 2, &TestMessage { value: 2 }).await.unwrap();
        relay.broadcast("b", 1, &TestMessage { value: 3 }).await.unwrap();

        assert_eq!(relay.message_count("a", 1), 1);
        assert_eq!(relay.message_count("a", 2), 1);
        assert_eq!(relay.message_count("b", 1), 1);
        assert_eq!(relay.message_count("b", 2), 0);

        let messages: Vec<TestMessage> = relay.collect_broadcasts("b", 1, 1).await.unwrap();
        assert_eq!(messages, vec![TestMessage { value: 3 }]);
    }

    #[tokio::test]
    async fn test_collect_waits_for_late_message() {
        let relay = MemoryRelay::new();
        let sender = relay.clone();

        let late = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.broadcast("s", 1, &TestMessage { value: 7 }).await
        });

        let messages: Vec<TestMessage> = relay.collect_broadcasts("s", 1, 1).await.unwrap();
        assert_eq!(messages[0].value, 7);
        late.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_collect_times_out() {
        let relay = MemoryRelay::with_timeout(Duration::from_millis(50));
        relay.broadcast("s", 1, &TestMessage { value: 1 }).await.unwrap();

        let result = relay.collect_broadcasts::<TestMessage>("s", 1, 2).await;
        assert!(matches!(result, Err(Error::Relay(_))));
    }
}
