//! Geometry
//!
//! Shapes drawn on the map and the fixed-point coordinates they are built
//! from.
//!
//! - [`FixedDecimal`]: 5-decimal fixed-point value, the unit of every topic coordinate
//! - [`Rectangle`]: axis-aligned box normalized from four corners
//! - [`Region`]: tagged set of supported shapes
//! - [`DrawnShape`]: unvalidated shape as pushed by the drawing UI

mod decimal;
mod error;
mod types;

pub use decimal::{
    format_magnitude, format_with_wildcard, FixedDecimal, DECIMAL_PLACES, UNITS_PER_DEGREE,
};
pub use error::{GeometryError, GeometryResult};
pub use types::{Coordinate, DrawnShape, Rectangle, Region};
