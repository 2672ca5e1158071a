//! Fixed-point decimal coordinates
//!
//! Coordinates travel through the feed as 5-decimal strings. Holding them as
//! integer counts of 0.00001 keeps span arithmetic and grid stepping exact,
//! and makes wildcard placement a matter of integer division instead of
//! string index surgery.

use std::fmt;

/// Number of decimal places carried by every coordinate
pub const DECIMAL_PLACES: u32 = 5;

/// Units per whole degree (10^DECIMAL_PLACES)
pub const UNITS_PER_DEGREE: i64 = 100_000;

/// A signed decimal value stored as an integer count of 0.00001
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedDecimal {
    units: i64,
}

impl FixedDecimal {
    /// Zero
    pub const ZERO: FixedDecimal = FixedDecimal { units: 0 };

    /// Build from a raw unit count
    pub const fn from_units(units: i64) -> Self {
        Self { units }
    }

    /// Round a float to the nearest 0.00001.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * UNITS_PER_DEGREE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self {
            units: scaled as i64,
        })
    }

    /// Raw unit count
    pub fn units(self) -> i64 {
        self.units
    }

    /// Absolute value as an unsigned unit count
    pub fn magnitude(self) -> u64 {
        self.units.unsigned_abs()
    }

    pub fn is_negative(self) -> bool {
        self.units < 0
    }

    pub fn to_f64(self) -> f64 {
        self.units as f64 / UNITS_PER_DEGREE as f64
    }

    /// Absolute difference between two values
    pub fn distance(self, other: FixedDecimal) -> FixedDecimal {
        Self {
            units: (self.units - other.units).abs(),
        }
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}", sign, format_magnitude(self.magnitude()))
    }
}

/// Format an unsigned unit count as `<int>.<5 decimals>`
pub fn format_magnitude(units: u64) -> String {
    let per_degree = UNITS_PER_DEGREE as u64;
    format!(
        "{}.{:0width$}",
        units / per_degree,
        units % per_degree,
        width = DECIMAL_PLACES as usize
    )
}

/// Format an unsigned unit count with a single-level wildcard replacing the
/// digit whose place value is `10^exponent`.
///
/// Every digit of greater place value is kept, everything from the wildcard
/// digit onward is dropped. Leading zeros above the wildcard are not
/// emitted, so `5.0` at the tens place formats as `*`.
///
/// `exponent` ranges from `1` (tens) down to `-(DECIMAL_PLACES)`.
pub fn format_with_wildcard(units: u64, exponent: i32, wildcard: char) -> String {
    debug_assert!(exponent <= 1 && exponent >= -(DECIMAL_PLACES as i32));

    let per_degree = UNITS_PER_DEGREE as u64;
    let whole = units / per_degree;

    if exponent >= 0 {
        // Wildcard sits in the integer part
        let kept = whole / 10u64.pow(exponent as u32 + 1);
        return if kept == 0 {
            wildcard.to_string()
        } else {
            format!("{}{}", kept, wildcard)
        };
    }

    // Wildcard sits in the fractional part; keep the decimals above it
    let kept_decimals = (-exponent - 1) as u32;
    let fraction = units % per_degree;
    let leading = fraction / 10u64.pow(DECIMAL_PLACES - kept_decimals);
    if kept_decimals == 0 {
        format!("{}.{}", whole, wildcard)
    } else {
        format!(
            "{}.{:0width$}{}",
            whole,
            leading,
            wildcard,
            width = kept_decimals as usize
        )
    }
}
