//! Covering grid generation
//!
//! A rectangle is covered by the cross product of longitude columns and
//! latitude rows. Each column/row is one topic fragment: the coordinate
//! formatted to 5 decimals with the digit at the axis precision replaced by
//! a single-level wildcard. One fragment matches every coordinate sharing its
//! kept digits, so the grid steps in units of that cell and the outermost
//! cells may reach past the rectangle (over-coverage).
//!
//! Topics encode a coordinate as an optional `-` followed by its magnitude,
//! so cells are laid out in magnitude space, separately on each side of
//! zero. A cell's span is half-open on the high-magnitude side: a rectangle
//! edge sitting exactly on a cell boundary does not pull in the next cell.

use super::precision::{AxisPrecision, AxisPrecisions, DecadeLadder, PrecisionPolicy};
use super::topic::{TopicFilter, TopicLayout, SINGLE_LEVEL_WILDCARD};
use crate::geometry::{format_magnitude, format_with_wildcard, FixedDecimal, Rectangle};
use std::sync::Arc;

/// Topic fragments for both axes of one rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Longitude fragments, one per column
    pub columns: Vec<String>,
    /// Latitude fragments, one per row
    pub rows: Vec<String>,
}

impl Grid {
    /// Number of filters this grid expands to
    pub fn len(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contiguous same-sign stretch of an axis, in magnitude units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SignedSpan {
    negative: bool,
    low: u64,
    high: u64,
}

/// Split `[min, max]` at zero into same-sign magnitude spans
fn signed_spans(min: FixedDecimal, max: FixedDecimal) -> Vec<SignedSpan> {
    if !min.is_negative() {
        vec![SignedSpan {
            negative: false,
            low: min.magnitude(),
            high: max.magnitude(),
        }]
    } else if max.units() <= 0 {
        vec![SignedSpan {
            negative: true,
            low: max.magnitude(),
            high: min.magnitude(),
        }]
    } else {
        vec![
            SignedSpan {
                negative: true,
                low: 0,
                high: min.magnitude(),
            },
            SignedSpan {
                negative: false,
                low: 0,
                high: max.magnitude(),
            },
        ]
    }
}

/// Topic fragment for the cell starting at `units`
fn fragment(negative: bool, units: u64, precision: AxisPrecision) -> String {
    let body = if precision.is_literal() {
        format_magnitude(units)
    } else {
        format_with_wildcard(units, precision.exponent(), SINGLE_LEVEL_WILDCARD)
    };
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Fragments covering `[min, max]` on one axis
pub fn axis_fragments(min: FixedDecimal, max: FixedDecimal, precision: AxisPrecision) -> Vec<String> {
    let width = precision.cell_units();
    let mut fragments = Vec::new();

    for span in signed_spans(min, max) {
        let first = span.low / width;
        let last = if !precision.is_literal() && span.high > span.low && span.high % width == 0 {
            span.high / width - 1
        } else {
            span.high / width
        };

        for cell in first..=last.max(first) {
            fragments.push(fragment(span.negative, cell * width, precision));
        }
    }

    fragments
}

/// Generates the topic filters that over-cover a rectangle
#[derive(Clone)]
pub struct GridGenerator {
    layout: TopicLayout,
    policy: Arc<dyn PrecisionPolicy>,
}

impl std::fmt::Debug for GridGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridGenerator")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new(TopicLayout::default())
    }
}

impl GridGenerator {
    /// Create a generator using the decade precision ladder
    pub fn new(layout: TopicLayout) -> Self {
        Self {
            layout,
            policy: Arc::new(DecadeLadder),
        }
    }

    /// Builder method: use a different precision policy
    pub fn with_policy(mut self, policy: Arc<dyn PrecisionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn layout(&self) -> &TopicLayout {
        &self.layout
    }

    pub fn policy(&self) -> &dyn PrecisionPolicy {
        self.policy.as_ref()
    }

    /// Per-axis precision for a rectangle
    pub fn precisions(&self, rectangle: &Rectangle) -> AxisPrecisions {
        self.policy
            .select_axes(rectangle.lat_span(), rectangle.lon_span())
    }

    /// Column and row fragments for a rectangle at the given precision
    pub fn grid(&self, rectangle: &Rectangle, precisions: AxisPrecisions) -> Grid {
        Grid {
            columns: axis_fragments(rectangle.min_lon(), rectangle.max_lon(), precisions.longitude),
            rows: axis_fragments(rectangle.min_lat(), rectangle.max_lat(), precisions.latitude),
        }
    }

    /// Filters covering a rectangle, precision chosen by the policy
    pub fn generate(&self, rectangle: &Rectangle) -> Vec<TopicFilter> {
        self.generate_with_precision(rectangle, self.precisions(rectangle))
    }

    /// Filters covering a rectangle at an explicit precision.
    ///
    /// Ordered column-major: every row of the first column, then the next.
    pub fn generate_with_precision(
        &self,
        rectangle: &Rectangle,
        precisions: AxisPrecisions,
    ) -> Vec<TopicFilter> {
        let grid = self.grid(rectangle, precisions);
        let mut filters = Vec::with_capacity(grid.len());
        for longitude in &grid.columns {
            for latitude in &grid.rows {
                filters.push(self.layout.coordinate_filter(latitude, longitude));
            }
        }

        tracing::trace!(
            lat_precision = %precisions.latitude,
            lon_precision = %precisions.longitude,
            columns = grid.columns.len(),
            rows = grid.rows.len(),
            "Generated covering grid"
        );

        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::topic_matches;

    fn rect(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Rectangle {
        Rectangle::from_bounds(min_lat, max_lat, min_lon, max_lon).unwrap()
    }

    fn topic_at(lat: f64, lon: f64) -> String {
        format!("FDPS/position/ID1/ACTIVE/AAL123/{:.5}/{:.5}/450/35000/120/-40", lat, lon)
    }

    #[test]
    fn test_one_degree_square_yields_single_filter() {
        let generator = GridGenerator::default();
        let rectangle = rect(35.0, 36.0, -100.0, -99.0);

        let precisions = generator.precisions(&rectangle);
        assert_eq!(precisions.latitude, AxisPrecision::Ones);
        assert_eq!(precisions.longitude, AxisPrecision::Ones);

        let filters = generator.generate(&rectangle);
        assert_eq!(
            filters,
            vec![TopicFilter::from("FDPS/position/*/*/*/3*/-9*/*/*/*/*")]
        );
    }

    #[test]
    fn test_grid_over_covers_past_cell_edge() {
        let generator = GridGenerator::default();
        // 0.5 x 0.5 degrees straddling the 39/40 and -98/-99 boundaries
        let rectangle = rect(39.75, 40.25, -99.25, -98.75);

        let filters = generator.generate(&rectangle);
        let strings: Vec<&str> = filters.iter().map(TopicFilter::as_str).collect();
        assert_eq!(
            strings,
            vec![
                "FDPS/position/*/*/*/39.*/-98.*/*/*/*/*",
                "FDPS/position/*/*/*/40.*/-98.*/*/*/*/*",
                "FDPS/position/*/*/*/39.*/-99.*/*/*/*/*",
                "FDPS/position/*/*/*/40.*/-99.*/*/*/*/*",
            ]
        );
    }

    #[test]
    fn test_high_magnitude_edge_on_cell_boundary_is_excluded() {
        let generator = GridGenerator::default();
        let filters = generator.generate(&rect(39.5, 40.0, -99.5, -99.0));
        assert_eq!(
            filters,
            vec![TopicFilter::from("FDPS/position/*/*/*/39.*/-99.*/*/*/*/*")]
        );

        let covered = |lat: f64, lon: f64| {
            let topic = topic_at(lat, lon);
            filters.iter().any(|filter| topic_matches(filter.as_str(), &topic))
        };
        // lat 40.0 opens the next cell; lon -99.0 is the low-magnitude edge
        assert!(!covered(40.0, -99.2));
        assert!(covered(39.99999, -99.2));
        assert!(covered(39.7, -99.0));
        assert!(covered(39.5, -99.49999));
    }

    #[test]
    fn test_mixed_precision_per_axis() {
        let generator = GridGenerator::default();
        // 12 degrees of longitude, 0.05 of latitude
        let rectangle = rect(39.81, 39.86, -110.0, -98.0);
        let precisions = generator.precisions(&rectangle);
        assert_eq!(precisions.longitude, AxisPrecision::Tens);
        assert_eq!(precisions.latitude, AxisPrecision::Hundredths);

        let grid = generator.grid(&rectangle, precisions);
        assert_eq!(grid.columns, vec!["-*", "-1*"]);
        assert_eq!(grid.rows, vec!["39.8*"]);
    }

    #[test]
    fn test_finest_tier_emits_literals() {
        let generator = GridGenerator::default();
        let rectangle = rect(39.82001, 39.82003, -98.57001, -98.57002);
        let grid = generator.grid(&rectangle, generator.precisions(&rectangle));
        assert_eq!(grid.rows, vec!["39.82001", "39.82002", "39.82003"]);
        assert_eq!(grid.columns, vec!["-98.57001", "-98.57002"]);
    }

    #[test]
    fn test_rectangle_crossing_zero() {
        let fragments = axis_fragments(
            FixedDecimal::from_f64(-0.5).unwrap(),
            FixedDecimal::from_f64(0.5).unwrap(),
            AxisPrecision::Tenths,
        );
        assert_eq!(fragments, vec!["-0.*", "0.*"]);
    }

    #[test]
    fn test_eastern_hemisphere_has_no_sign() {
        let generator = GridGenerator::default();
        let rectangle = rect(48.1, 48.6, 2.1, 2.6);
        let filters = generator.generate(&rectangle);
        assert_eq!(
            filters,
            vec![TopicFilter::from("FDPS/position/*/*/*/48.*/2.*/*/*/*/*")]
        );
    }

    #[test]
    fn test_every_filter_touches_the_interior() {
        let generator = GridGenerator::default();
        let rectangle = rect(39.75, 40.25, -99.25, -98.75);
        let filters = generator.generate(&rectangle);

        // Sample the interior on a fine lattice
        let mut samples = Vec::new();
        for i in 1..50 {
            for j in 1..50 {
                let lat = 39.75 + 0.5 * i as f64 / 50.0;
                let lon = -99.25 + 0.5 * j as f64 / 50.0;
                samples.push(topic_at(lat, lon));
            }
        }

        for filter in &filters {
            assert!(
                samples.iter().any(|topic| topic_matches(filter.as_str(), topic)),
                "filter {} matches nothing inside the rectangle",
                filter
            );
        }

        for topic in &samples {
            assert!(
                filters.iter().any(|filter| topic_matches(filter.as_str(), topic)),
                "interior topic {} is not covered",
                topic
            );
        }
    }

    #[test]
    fn test_coverage_across_tiers() {
        let generator = GridGenerator::default();
        let cases = [
            rect(30.0, 45.0, -110.0, -95.0),
            rect(35.2, 37.9, -101.3, -99.1),
            rect(39.80, 39.95, -98.60, -98.45),
            rect(39.801, 39.809, -98.571, -98.565),
            rect(39.8011, 39.8019, -98.5711, -98.5704),
        ];

        for rectangle in &cases {
            let filters = generator.generate(rectangle);
            assert!(!filters.is_empty());

            let lat_lo = rectangle.min_lat().to_f64();
            let lat_hi = rectangle.max_lat().to_f64();
            let lon_lo = rectangle.min_lon().to_f64();
            let lon_hi = rectangle.max_lon().to_f64();

            for i in 1..10 {
                for j in 1..10 {
                    let lat = lat_lo + (lat_hi - lat_lo) * i as f64 / 10.0;
                    let lon = lon_lo + (lon_hi - lon_lo) * j as f64 / 10.0;
                    let topic = topic_at(lat, lon);
                    assert!(
                        filters.iter().any(|f| topic_matches(f.as_str(), &topic)),
                        "{} not covered by {:?}",
                        topic,
                        filters
                    );
                }
            }
        }
    }
}
