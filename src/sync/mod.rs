//! Subscription Synchronization
//!
//! Debounces region edits and keeps a messaging client's subscriptions
//! matching the committed regions.

mod retry;
mod state;
mod synchronizer;

pub use retry::RetryPolicy;
pub use state::{SubscriptionSet, SyncPhase, SyncReport};
pub use synchronizer::{CommitHook, SubscriptionSynchronizer, SynchronizerOptions};
