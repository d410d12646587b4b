//! One-line user notifications carried across the post/redirect cycle

use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Per-user notification queues, drained by the next rendered view
pub struct Notifier {
    queues: RwLock<HashMap<Uuid, Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
        }
    }

    pub async fn success(&self, user: Uuid, message: impl Into<String>) {
        self.push(user, NotificationKind::Success, message.into()).await;
    }

    pub async fn error(&self, user: Uuid, message: impl Into<String>) {
        self.push(user, NotificationKind::Error, message.into()).await;
    }

    async fn push(&self, user: Uuid, kind: NotificationKind, message: String) {
        self.queues
            .write()
            .await
            .entry(user)
            .or_default()
            .push(Notification { kind, message });
    }

    /// Take every pending notification for a user
    pub async fn drain(&self, user: Uuid) -> Vec<Notification> {
        self.queues.write().await.remove(&user).unwrap_or_default()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_in_order_and_empties() {
        let notifier = Notifier::new();
        let user = Uuid::new_v4();

        notifier.error(user, "Invalid index name.").await;
        notifier.success(user, "The search index has been updated.").await;

        let pending = notifier.drain(user).await;
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].kind, NotificationKind::Error);
        assert_eq!(pending[1].message, "The search index has been updated.");
        assert!(notifier.drain(user).await.is_empty());
    }

    #[tokio::test]
    async fn test_queues_are_per_user() {
        let notifier = Notifier::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        notifier.success(alice, "done").await;

        assert!(notifier.drain(bob).await.is_empty());
        assert_eq!(notifier.drain(alice).await.len(), 1);
    }
}
