//! Geometry error types
//!
//! Errors raised while turning user-drawn shapes into something the grid
//! generator can cover.

use thiserror::Error;

/// Errors that make a region unusable for filter generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite
    #[error("Non-finite coordinate: lat={lat}, lon={lon}")]
    NonFinite { lat: f64, lon: f64 },

    /// A coordinate lies outside the valid latitude/longitude range
    #[error("Coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange { lat: f64, lon: f64 },

    /// Fewer (or more) than four distinct corners after deduplication
    #[error("Rectangle needs 4 distinct corners, found {found}")]
    DegenerateCorners { found: usize },

    /// Corners do not line up on two longitudes and two latitudes
    #[error("Rectangle corners are not axis-aligned")]
    NotAxisAligned,

    /// The drawing tool produced a shape the filter generator cannot cover
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),
}

/// Result type alias for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeometryError::DegenerateCorners { found: 2 };
        assert_eq!(err.to_string(), "Rectangle needs 4 distinct corners, found 2");

        let err = GeometryError::NotAxisAligned;
        assert_eq!(err.to_string(), "Rectangle corners are not axis-aligned");
    }
}
