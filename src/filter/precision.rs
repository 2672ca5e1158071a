//! Wildcard precision ladder
//!
//! Each axis of a rectangle gets its own precision, chosen from the extent
//! of the rectangle on that axis. Coarse rectangles get short topic prefixes
//! (few filters, wide cells); fine rectangles get long prefixes so the
//! subscription does not balloon to the whole continent.

use crate::geometry::{FixedDecimal, DECIMAL_PLACES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Digit position at which an axis is wildcarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPrecision {
    /// 0.00001 - full 5-decimal literal, no wildcard
    HundredThousandths,
    /// 0.0001
    TenThousandths,
    /// 0.001
    Thousandths,
    /// 0.01
    Hundredths,
    /// 0.1
    Tenths,
    /// 1
    Ones,
    /// 10
    Tens,
}

impl AxisPrecision {
    /// All tiers, coarsest first
    pub const LADDER: [AxisPrecision; 7] = [
        AxisPrecision::Tens,
        AxisPrecision::Ones,
        AxisPrecision::Tenths,
        AxisPrecision::Hundredths,
        AxisPrecision::Thousandths,
        AxisPrecision::TenThousandths,
        AxisPrecision::HundredThousandths,
    ];

    /// Base-10 exponent of the tier (`Tens` = 1, `HundredThousandths` = -5)
    pub fn exponent(self) -> i32 {
        match self {
            AxisPrecision::Tens => 1,
            AxisPrecision::Ones => 0,
            AxisPrecision::Tenths => -1,
            AxisPrecision::Hundredths => -2,
            AxisPrecision::Thousandths => -3,
            AxisPrecision::TenThousandths => -4,
            AxisPrecision::HundredThousandths => -5,
        }
    }

    /// Tier magnitude in degrees
    pub fn magnitude(self) -> f64 {
        10f64.powi(self.exponent())
    }

    /// Tier magnitude in fixed-point units
    pub fn magnitude_units(self) -> u64 {
        10u64.pow((self.exponent() + DECIMAL_PLACES as i32) as u32)
    }

    /// Whether the finest tier, which emits plain 5-decimal literals
    pub fn is_literal(self) -> bool {
        self == AxisPrecision::HundredThousandths
    }

    /// Width in units of the area one topic fragment matches.
    ///
    /// A wildcard replacing the digit of place `p` leaves the digits of place
    /// `10p` and above fixed, so one fragment spans `10p`. Literals span a
    /// single unit.
    pub fn cell_units(self) -> u64 {
        if self.is_literal() {
            1
        } else {
            self.magnitude_units() * 10
        }
    }

    /// Select the tier for an extent given in fixed-point units
    pub fn for_extent_units(extent: u64) -> Self {
        Self::LADDER
            .into_iter()
            .find(|tier| !tier.is_literal() && extent >= tier.magnitude_units())
            .unwrap_or(AxisPrecision::HundredThousandths)
    }
}

impl fmt::Display for AxisPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = (-self.exponent()).max(0) as usize;
        write!(f, "{:.*}", decimals, self.magnitude())
    }
}

/// Select the precision for an axis extent in degrees.
///
/// Negative extents are taken by absolute value; non-finite extents select
/// the finest tier.
pub fn select_precision(extent: f64) -> AxisPrecision {
    match FixedDecimal::from_f64(extent.abs()) {
        Some(fixed) => AxisPrecision::for_extent_units(fixed.magnitude()),
        None => AxisPrecision::HundredThousandths,
    }
}

/// Precision chosen for both axes of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPrecisions {
    pub latitude: AxisPrecision,
    pub longitude: AxisPrecision,
}

/// Strategy for turning an axis extent into a wildcard precision
pub trait PrecisionPolicy: Send + Sync {
    /// Precision for one axis given its extent
    fn select(&self, extent: FixedDecimal) -> AxisPrecision;

    /// Precision for both axes
    fn select_axes(&self, lat_extent: FixedDecimal, lon_extent: FixedDecimal) -> AxisPrecisions {
        AxisPrecisions {
            latitude: self.select(lat_extent),
            longitude: self.select(lon_extent),
        }
    }
}

/// The default decade ladder: one tier per order of magnitude
#[derive(Debug, Clone, Copy, Default)]
pub struct DecadeLadder;

impl PrecisionPolicy for DecadeLadder {
    fn select(&self, extent: FixedDecimal) -> AxisPrecision {
        AxisPrecision::for_extent_units(extent.magnitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(select_precision(120.0), AxisPrecision::Tens);
        assert_eq!(select_precision(10.0), AxisPrecision::Tens);
        assert_eq!(select_precision(9.99999), AxisPrecision::Ones);
        assert_eq!(select_precision(1.0), AxisPrecision::Ones);
        assert_eq!(select_precision(0.5), AxisPrecision::Tenths);
        assert_eq!(select_precision(0.1), AxisPrecision::Tenths);
        assert_eq!(select_precision(0.05), AxisPrecision::Hundredths);
        assert_eq!(select_precision(0.001), AxisPrecision::Thousandths);
        assert_eq!(select_precision(0.0005), AxisPrecision::TenThousandths);
        assert_eq!(select_precision(0.0001), AxisPrecision::TenThousandths);
        assert_eq!(select_precision(0.00009), AxisPrecision::HundredThousandths);
        assert_eq!(select_precision(0.0), AxisPrecision::HundredThousandths);
    }

    #[test]
    fn test_negative_and_non_finite_extents() {
        assert_eq!(select_precision(-1.5), AxisPrecision::Ones);
        assert_eq!(select_precision(f64::NAN), AxisPrecision::HundredThousandths);
    }

    #[test]
    fn test_fixed_point_avoids_float_drift() {
        // 36.0 - 35.9 lands just under 0.1 in floating point
        assert_eq!(select_precision(36.0 - 35.9), AxisPrecision::Tenths);
    }

    #[test]
    fn test_selection_is_monotonic() {
        let mut previous = AxisPrecision::HundredThousandths;
        for step in 0..=2_000_000u64 / 997 {
            let extent = step * 997;
            let precision = AxisPrecision::for_extent_units(extent);
            assert!(
                precision >= previous,
                "extent {} selected {:?} after {:?}",
                extent,
                precision,
                previous
            );
            previous = precision;
        }
    }

    #[test]
    fn test_cell_widths() {
        assert_eq!(AxisPrecision::Tens.cell_units(), 10_000_000);
        assert_eq!(AxisPrecision::Ones.cell_units(), 1_000_000);
        assert_eq!(AxisPrecision::Tenths.cell_units(), 100_000);
        assert_eq!(AxisPrecision::TenThousandths.cell_units(), 100);
        assert_eq!(AxisPrecision::HundredThousandths.cell_units(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(AxisPrecision::Tens.to_string(), "10");
        assert_eq!(AxisPrecision::Ones.to_string(), "1");
        assert_eq!(AxisPrecision::Hundredths.to_string(), "0.01");
        assert_eq!(AxisPrecision::HundredThousandths.to_string(), "0.00001");
    }

    #[test]
    fn test_decade_ladder_policy() {
        let policy = DecadeLadder;
        let axes = policy.select_axes(FixedDecimal::from_units(100_000), FixedDecimal::from_units(20));
        assert_eq!(axes.latitude, AxisPrecision::Ones);
        assert_eq!(axes.longitude, AxisPrecision::HundredThousandths);
    }
}
