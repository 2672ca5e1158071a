//! Feed session
//!
//! Latest position per aircraft plus a running message count. Handlers run
//! synchronously inside message dispatch, so state sits behind std locks
//! rather than async ones.

use super::error::FeedResult;
use super::event::FlightPositionEvent;
use crate::messaging::MessageHandler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Latest known position of one aircraft
#[derive(Debug, Clone, Serialize)]
pub struct TrackedAircraft {
    pub event: FlightPositionEvent,
    pub last_seen: DateTime<Utc>,
}

/// Point-in-time counters for a session
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub aircraft_tracked: usize,
}

/// Aggregates flight positions delivered by the subscriptions
#[derive(Debug, Default)]
pub struct FeedSession {
    aircraft: RwLock<HashMap<String, TrackedAircraft>>,
    messages_received: AtomicU64,
    messages_rejected: AtomicU64,
}

impl FeedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an event as its aircraft's latest position
    pub fn record(&self, event: FlightPositionEvent) {
        let tracked = TrackedAircraft {
            event,
            last_seen: Utc::now(),
        };
        self.aircraft
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tracked.event.aircraft_id.clone(), tracked);
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Parse and record a topic, returning the recorded event
    pub fn handle_topic(&self, topic: &str) -> FeedResult<FlightPositionEvent> {
        match FlightPositionEvent::parse(topic) {
            Ok(event) => {
                self.record(event.clone());
                Ok(event)
            }
            Err(e) => {
                self.messages_rejected.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Message handler feeding this session
    pub fn handler(self: &Arc<Self>) -> MessageHandler {
        let session = Arc::clone(self);
        Arc::new(move |topic: &str, _payload: &[u8]| {
            if let Err(e) = session.handle_topic(topic) {
                tracing::warn!(topic = %topic, error = %e, "Rejected flight position");
            }
        })
    }

    /// Forget every tracked aircraft. Message counters are kept.
    pub fn clear_aircraft(&self) {
        let mut aircraft = self.aircraft.write().unwrap_or_else(PoisonError::into_inner);
        let cleared = aircraft.len();
        aircraft.clear();
        tracing::debug!(cleared, "Cleared tracked aircraft");
    }

    pub fn aircraft(&self, aircraft_id: &str) -> Option<TrackedAircraft> {
        self.aircraft
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(aircraft_id)
            .cloned()
    }

    /// Every tracked aircraft, sorted by id
    pub fn snapshot(&self) -> Vec<TrackedAircraft> {
        let mut all: Vec<TrackedAircraft> = self
            .aircraft
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.event.aircraft_id.cmp(&b.event.aircraft_id));
        all
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            messages_received: self.messages_received(),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            aircraft_tracked: self.aircraft_count(),
        }
    }
}
