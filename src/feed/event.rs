//! Flight position events
//!
//! A flight position is carried entirely in the topic name:
//! `root/feed/identifier/status/aircraftId/lat/lon/speed/altitude/velocityX/velocityY`.
//! The payload is not inspected.

use super::error::{FeedError, FeedResult};
use crate::filter::{segment, LEVEL_SEPARATOR};
use crate::messaging::MessageHandler;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One flight position parsed from its topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPositionEvent {
    pub root: String,
    pub feed: String,
    pub identifier: String,
    pub status: String,
    pub aircraft_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Passed through as published
    pub speed: String,
    /// Passed through as published
    pub altitude: String,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl FlightPositionEvent {
    /// Parse a flight position topic
    pub fn parse(topic: &str) -> FeedResult<Self> {
        let levels: Vec<&str> = topic.split(LEVEL_SEPARATOR).collect();
        if levels.len() != segment::COUNT {
            return Err(FeedError::WrongSegmentCount {
                expected: segment::COUNT,
                found: levels.len(),
            });
        }

        Ok(Self {
            root: levels[segment::ROOT].to_string(),
            feed: levels[segment::FEED].to_string(),
            identifier: levels[segment::IDENTIFIER].to_string(),
            status: levels[segment::STATUS].to_string(),
            aircraft_id: levels[segment::AIRCRAFT_ID].to_string(),
            latitude: parse_number("latitude", levels[segment::LATITUDE])?,
            longitude: parse_number("longitude", levels[segment::LONGITUDE])?,
            speed: levels[segment::SPEED].to_string(),
            altitude: levels[segment::ALTITUDE].to_string(),
            velocity_x: parse_number("velocity_x", levels[segment::VELOCITY_X])?,
            velocity_y: parse_number("velocity_y", levels[segment::VELOCITY_Y])?,
        })
    }

    /// Compass heading in degrees, clockwise from north in `[0, 360)`.
    ///
    /// `velocity_x` is the eastward and `velocity_y` the northward
    /// component. `None` when the aircraft is not moving.
    pub fn heading(&self) -> Option<f64> {
        if self.velocity_x == 0.0 && self.velocity_y == 0.0 {
            return None;
        }
        let degrees = self.velocity_x.atan2(self.velocity_y).to_degrees();
        Some(degrees.rem_euclid(360.0))
    }
}

fn parse_number(field: &'static str, value: &str) -> FeedResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Wrap a `(topic, event)` callback as a raw message handler.
///
/// Topics that do not parse as flight positions are logged and dropped.
pub fn event_handler<F>(on_event: F) -> MessageHandler
where
    F: Fn(&str, &FlightPositionEvent) + Send + Sync + 'static,
{
    Arc::new(move |topic: &str, _payload: &[u8]| match FlightPositionEvent::parse(topic) {
        Ok(event) => on_event(topic, &event),
        Err(e) => tracing::warn!(topic = %topic, error = %e, "Dropping unparseable flight position"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const TOPIC: &str = "FDPS/position/ID42/ACTIVE/UAL123/35.51234/-99.12000/420/31000/10/-10";

    #[test]
    fn test_parse_topic() {
        let event = FlightPositionEvent::parse(TOPIC).unwrap();
        assert_eq!(event.root, "FDPS");
        assert_eq!(event.feed, "position");
        assert_eq!(event.identifier, "ID42");
        assert_eq!(event.status, "ACTIVE");
        assert_eq!(event.aircraft_id, "UAL123");
        assert_eq!(event.latitude, 35.51234);
        assert_eq!(event.longitude, -99.12);
        assert_eq!(event.speed, "420");
        assert_eq!(event.altitude, "31000");
        assert_eq!(event.velocity_x, 10.0);
        assert_eq!(event.velocity_y, -10.0);
    }

    #[test]
    fn test_parse_wrong_level_count() {
        let err = FlightPositionEvent::parse("FDPS/position/ID42").unwrap_err();
        assert_eq!(
            err,
            FeedError::WrongSegmentCount {
                expected: 11,
                found: 3
            }
        );
    }

    #[test]
    fn test_parse_invalid_latitude() {
        let err = FlightPositionEvent::parse(
            "FDPS/position/ID42/ACTIVE/UAL123/north/-99.1/420/31000/10/10",
        )
        .unwrap_err();
        assert!(matches!(err, FeedError::InvalidNumber { field: "latitude", .. }));
    }

    #[test]
    fn test_heading() {
        let mut event = FlightPositionEvent::parse(TOPIC).unwrap();
        let mut heading_for = |vx: f64, vy: f64| {
            event.velocity_x = vx;
            event.velocity_y = vy;
            event.heading()
        };

        let cases = [(0.0, 5.0, 0.0), (5.0, 0.0, 90.0), (10.0, -10.0, 135.0), (-5.0, 0.0, 270.0)];
        for (vx, vy, expected) in cases {
            let heading = heading_for(vx, vy).unwrap();
            assert!((heading - expected).abs() < 1e-9, "({vx}, {vy}) gave {heading}");
        }
        assert_eq!(heading_for(0.0, 0.0), None);
    }

    #[test]
    fn test_event_handler_parses_topics() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = event_handler(move |_topic, event| {
            sink.lock().unwrap().push(event.aircraft_id.clone());
        });

        handler(TOPIC, b"");
        handler("FDPS/position/garbage", b"");

        assert_eq!(*seen.lock().unwrap(), vec!["UAL123".to_string()]);
    }
}
