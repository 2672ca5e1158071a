//! Messaging client abstraction
//!
//! The synchronizer drives any broker session through this trait. The
//! session handshake, authentication and transport belong to the
//! implementation; the synchronizer only asks for subscriptions.

use super::error::SubscriptionResult;
use crate::filter::TopicFilter;
use async_trait::async_trait;
use std::sync::Arc;

/// Callback invoked with `(topic, payload)` for every matched message
pub type MessageHandler = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Common trait for broker sessions
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Establish the session
    async fn connect(&self) -> SubscriptionResult<()>;

    /// Add a subscription, routing its messages to `handler`
    async fn subscribe(&self, filter: &TopicFilter, handler: MessageHandler) -> SubscriptionResult<()>;

    /// Remove a single subscription
    async fn unsubscribe(&self, filter: &TopicFilter) -> SubscriptionResult<()>;

    /// Remove every subscription held by this session
    async fn unsubscribe_all(&self) -> SubscriptionResult<()>;
}
