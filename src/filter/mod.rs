//! Geofilter Generation
//!
//! Turns map regions into broker topic filters.
//!
//! ## Pipeline
//!
//! 1. [`PrecisionPolicy`] picks a wildcard digit per axis from the region's extent
//! 2. [`GridGenerator`] enumerates longitude columns and latitude rows
//! 3. [`TopicLayout`] composes each (column, row) into a full topic filter
//!
//! Filters over-cover: the area a filter matches may reach past the region,
//! never fall short of its interior.

mod grid;
mod precision;
mod topic;

pub use grid::{axis_fragments, Grid, GridGenerator};
pub use precision::{
    select_precision, AxisPrecision, AxisPrecisions, DecadeLadder, PrecisionPolicy,
};
pub use topic::{
    segment, TopicFilter, TopicLayout, LEVEL_SEPARATOR, MULTI_LEVEL_WILDCARD,
    SINGLE_LEVEL_WILDCARD,
};

use crate::geometry::{Rectangle, Region};

/// Shapes that can be covered by a set of topic filters
pub trait CoveringFilters {
    /// Filters whose union covers the shape's interior
    fn covering_filters(&self, generator: &GridGenerator) -> Vec<TopicFilter>;
}

impl CoveringFilters for Rectangle {
    fn covering_filters(&self, generator: &GridGenerator) -> Vec<TopicFilter> {
        generator.generate(self)
    }
}

impl CoveringFilters for Region {
    fn covering_filters(&self, generator: &GridGenerator) -> Vec<TopicFilter> {
        match self {
            Region::Rectangle(rectangle) => rectangle.covering_filters(generator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Always wildcards at the ones digit
    struct FixedOnes;

    impl PrecisionPolicy for FixedOnes {
        fn select(&self, _extent: crate::geometry::FixedDecimal) -> AxisPrecision {
            AxisPrecision::Ones
        }
    }

    #[test]
    fn test_region_dispatches_to_rectangle() {
        let generator = GridGenerator::default();
        let rectangle = Rectangle::from_bounds(35.0, 36.0, -100.0, -99.0).unwrap();
        let region = Region::from(rectangle.clone());
        assert_eq!(
            region.covering_filters(&generator),
            rectangle.covering_filters(&generator)
        );
    }

    #[test]
    fn test_custom_policy_is_used() {
        let generator = GridGenerator::default().with_policy(Arc::new(FixedOnes));
        let rectangle = Rectangle::from_bounds(39.81, 39.82, -98.58, -98.57).unwrap();
        let filters = rectangle.covering_filters(&generator);
        assert_eq!(
            filters,
            vec![TopicFilter::from("FDPS/position/*/*/*/3*/-9*/*/*/*/*")]
        );
    }
}
