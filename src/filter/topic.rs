//! Topic filters and the flight position topic layout
//!
//! Flight positions are published on
//! `root/feed/identifier/status/aircraftId/lat/lon/speed/altitude/velocityX/velocityY`.
//! Only the coordinate segments carry values in a geofilter; every other
//! segment is a single-level wildcard.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Single-level wildcard token
pub const SINGLE_LEVEL_WILDCARD: char = '*';

/// Multi-level wildcard token
pub const MULTI_LEVEL_WILDCARD: char = '>';

/// Topic level separator
pub const LEVEL_SEPARATOR: char = '/';

/// A broker subscription pattern
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicFilter(String);

impl TopicFilter {
    pub fn new(filter: impl Into<String>) -> Self {
        Self(filter.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of `/`-delimited levels
    pub fn level_count(&self) -> usize {
        self.0.split(LEVEL_SEPARATOR).count()
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TopicFilter {
    fn from(filter: String) -> Self {
        Self(filter)
    }
}

impl From<&str> for TopicFilter {
    fn from(filter: &str) -> Self {
        Self(filter.to_string())
    }
}

impl AsRef<str> for TopicFilter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TopicFilter {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Positions of named segments in a flight position topic
pub mod segment {
    pub const ROOT: usize = 0;
    pub const FEED: usize = 1;
    pub const IDENTIFIER: usize = 2;
    pub const STATUS: usize = 3;
    pub const AIRCRAFT_ID: usize = 4;
    pub const LATITUDE: usize = 5;
    pub const LONGITUDE: usize = 6;
    pub const SPEED: usize = 7;
    pub const ALTITUDE: usize = 8;
    pub const VELOCITY_X: usize = 9;
    pub const VELOCITY_Y: usize = 10;

    /// Total number of levels in a flight position topic
    pub const COUNT: usize = 11;
}

/// Root and feed prefix of the flight position topic tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLayout {
    pub root: String,
    pub feed: String,
}

impl Default for TopicLayout {
    fn default() -> Self {
        Self {
            root: "FDPS".to_string(),
            feed: "position".to_string(),
        }
    }
}

impl TopicLayout {
    pub fn new(root: impl Into<String>, feed: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            feed: feed.into(),
        }
    }

    /// Filter matching every event on the feed
    pub fn catch_all(&self) -> TopicFilter {
        TopicFilter(format!(
            "{}{sep}{}{sep}{}",
            self.root,
            self.feed,
            MULTI_LEVEL_WILDCARD,
            sep = LEVEL_SEPARATOR
        ))
    }

    /// Filter with the given latitude/longitude fragments and wildcards
    /// everywhere else
    pub fn coordinate_filter(&self, latitude: &str, longitude: &str) -> TopicFilter {
        let wildcard = SINGLE_LEVEL_WILDCARD.to_string();
        let mut levels: Vec<&str> = vec![wildcard.as_str(); segment::COUNT];
        levels[segment::ROOT] = self.root.as_str();
        levels[segment::FEED] = self.feed.as_str();
        levels[segment::LATITUDE] = latitude;
        levels[segment::LONGITUDE] = longitude;
        TopicFilter(levels.join(&LEVEL_SEPARATOR.to_string()))
    }
}
