//! Synchronizer state types

use crate::filter::TopicFilter;
use crate::messaging::MessageHandler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle phase of the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// No messaging client attached
    Idle,
    /// Attached; subscriptions reflect the committed regions
    Active,
    /// An unsubscribe/subscribe round is in flight
    Syncing,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Idle => write!(f, "idle"),
            SyncPhase::Active => write!(f, "active"),
            SyncPhase::Syncing => write!(f, "syncing"),
        }
    }
}

/// Filters believed subscribed on the broker, each with its handler
#[derive(Clone, Default)]
pub struct SubscriptionSet {
    entries: BTreeMap<TopicFilter, MessageHandler>,
}

impl fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the filter was already present
    pub fn insert(&mut self, filter: TopicFilter, handler: MessageHandler) -> bool {
        self.entries.insert(filter, handler).is_none()
    }

    pub fn contains(&self, filter: &TopicFilter) -> bool {
        self.entries.contains_key(filter)
    }

    pub fn handler(&self, filter: &TopicFilter) -> Option<&MessageHandler> {
        self.entries.get(filter)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filters in sorted order
    pub fn filters(&self) -> Vec<TopicFilter> {
        self.entries.keys().cloned().collect()
    }
}

/// Outcome of one unsubscribe/subscribe round
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// 1-based round counter
    pub round: u64,
    /// Regions in the committed set
    pub regions: usize,
    /// Regions that could not be turned into filters
    pub regions_skipped: usize,
    /// Distinct filters the round tried to subscribe
    pub planned: usize,
    pub subscribed: usize,
    pub failed: Vec<TopicFilter>,
    pub unsubscribe_all_ok: bool,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl SyncReport {
    /// Every planned filter was subscribed and the reset succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unsubscribe_all_ok && self.regions_skipped == 0
    }
}
