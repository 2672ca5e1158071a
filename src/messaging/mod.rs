//! Messaging
//!
//! The broker-session seam: a client trait the synchronizer drives, a router
//! that dispatches inbound topics to handlers, and a loopback client that
//! runs the whole path in process.

mod client;
mod error;
mod memory;
mod router;

pub use client::{MessageHandler, MessagingClient};
pub use error::{SubscriptionError, SubscriptionResult};
pub use memory::LoopbackClient;
pub use router::TopicRouter;
