//! In-process loopback client
//!
//! Implements [`MessagingClient`] without a network: subscriptions live in a
//! local [`TopicRouter`] and [`LoopbackClient::publish`] delivers a topic to
//! every matching handler. The runtime binary uses it to replay topics read
//! from stdin through the same subscription path a broker session would use.

use super::client::{MessageHandler, MessagingClient};
use super::error::{SubscriptionError, SubscriptionResult};
use super::router::TopicRouter;
use crate::filter::TopicFilter;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Loopback broker session
#[derive(Debug, Default)]
pub struct LoopbackClient {
    connected: RwLock<bool>,
    router: Arc<RwLock<TopicRouter>>,
}

impl LoopbackClient {
    /// Create a disconnected client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that is already connected
    pub fn connected() -> Self {
        Self {
            connected: RwLock::new(true),
            router: Arc::new(RwLock::new(TopicRouter::new())),
        }
    }

    pub async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }

    /// Close the session, dropping every subscription
    pub async fn disconnect(&self) {
        let mut connected = self.connected.write().await;
        if *connected {
            *connected = false;
            let dropped = self.router.write().await.clear();
            tracing::info!(dropped = dropped.len(), "Loopback session disconnected");
        }
    }

    /// Current subscriptions in sorted order
    pub async fn subscriptions(&self) -> Vec<TopicFilter> {
        self.router.read().await.filters()
    }

    pub async fn subscription_count(&self) -> usize {
        self.router.read().await.len()
    }

    /// Deliver a message to every matching subscription.
    ///
    /// Handlers run after the router lock is released, so a handler may
    /// itself publish or subscribe. Returns the number of handlers invoked.
    pub async fn publish(&self, topic: &str, payload: &[u8]) -> SubscriptionResult<usize> {
        self.ensure_connected().await?;

        let handlers = self.router.read().await.matching_handlers(topic);
        for handler in &handlers {
            handler(topic, payload);
        }

        tracing::trace!(topic = %topic, delivered = handlers.len(), "Published message");
        Ok(handlers.len())
    }

    async fn ensure_connected(&self) -> SubscriptionResult<()> {
        if *self.connected.read().await {
            Ok(())
        } else {
            Err(SubscriptionError::NotConnected)
        }
    }
}

#[async_trait]
impl MessagingClient for LoopbackClient {
    async fn connect(&self) -> SubscriptionResult<()> {
        let mut connected = self.connected.write().await;
        if *connected {
            return Err(SubscriptionError::AlreadyConnected);
        }
        *connected = true;
        tracing::info!("Loopback session connected");
        Ok(())
    }

    async fn subscribe(&self, filter: &TopicFilter, handler: MessageHandler) -> SubscriptionResult<()> {
        self.ensure_connected().await?;

        let added = self.router.write().await.insert(filter.clone(), handler)?;
        if added {
            tracing::debug!(filter = %filter, "Subscribed");
        } else {
            tracing::warn!(filter = %filter, "Already subscribed");
        }
        Ok(())
    }

    async fn unsubscribe(&self, filter: &TopicFilter) -> SubscriptionResult<()> {
        self.ensure_connected().await?;

        if self.router.write().await.remove(filter) {
            tracing::debug!(filter = %filter, "Unsubscribed");
        } else {
            tracing::warn!(filter = %filter, "Not subscribed");
        }
        Ok(())
    }

    async fn unsubscribe_all(&self) -> SubscriptionResult<()> {
        self.ensure_connected().await?;

        let removed = self.router.write().await.clear();
        tracing::debug!(removed = removed.len(), "Unsubscribed from all topics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_handler(log: &Arc<Mutex<Vec<String>>>) -> MessageHandler {
        let log = Arc::clone(log);
        Arc::new(move |topic: &str, _payload: &[u8]| {
            log.lock().unwrap().push(topic.to_string());
        })
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let client = LoopbackClient::new();
        let handler: MessageHandler = Arc::new(|_: &str, _: &[u8]| {});

        assert_eq!(
            client.subscribe(&"a/>".into(), handler).await,
            Err(SubscriptionError::NotConnected)
        );
        assert_eq!(client.unsubscribe_all().await, Err(SubscriptionError::NotConnected));
        assert_eq!(client.publish("a/b", b"").await, Err(SubscriptionError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let client = LoopbackClient::new();
        client.connect().await.unwrap();
        assert_eq!(client.connect().await, Err(SubscriptionError::AlreadyConnected));
        assert!(client.is_connected().await);
    }

    #[tokio::test]
    async fn test_publish_reaches_matching_subscriptions() {
        let client = LoopbackClient::connected();
        let log = Arc::new(Mutex::new(Vec::new()));

        client
            .subscribe(&"FDPS/position/*/*/*/3*/-9*/*/*/*/*".into(), recording_handler(&log))
            .await
            .unwrap();

        let inside = "FDPS/position/ID/ACTIVE/UAL1/35.5/-99.5/420/31000/10/20";
        let outside = "FDPS/position/ID/ACTIVE/UAL1/45.5/-99.5/420/31000/10/20";
        assert_eq!(client.publish(inside, b"").await.unwrap(), 1);
        assert_eq!(client.publish(outside, b"").await.unwrap(), 0);

        assert_eq!(*log.lock().unwrap(), vec![inside.to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_is_not_an_error() {
        let client = LoopbackClient::connected();
        let handler: MessageHandler = Arc::new(|_: &str, _: &[u8]| {});

        client.subscribe(&"a/>".into(), handler.clone()).await.unwrap();
        client.subscribe(&"a/>".into(), handler).await.unwrap();
        assert_eq!(client.subscription_count().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_filter_is_rejected() {
        let client = LoopbackClient::connected();
        let handler: MessageHandler = Arc::new(|_: &str, _: &[u8]| {});

        let err = client.subscribe(&"a/>/b".into(), handler).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_unsubscribe_all_and_disconnect() {
        let client = LoopbackClient::connected();
        let handler: MessageHandler = Arc::new(|_: &str, _: &[u8]| {});

        client.subscribe(&"a/>".into(), handler.clone()).await.unwrap();
        client.subscribe(&"b/>".into(), handler.clone()).await.unwrap();
        client.unsubscribe(&"a/>".into()).await.unwrap();
        assert_eq!(client.subscriptions().await, vec![TopicFilter::from("b/>")]);

        client.unsubscribe_all().await.unwrap();
        assert!(client.subscriptions().await.is_empty());

        client.subscribe(&"c/>".into(), handler).await.unwrap();
        client.disconnect().await;
        assert!(!client.is_connected().await);
        assert_eq!(client.subscription_count().await, 0);
    }
}
