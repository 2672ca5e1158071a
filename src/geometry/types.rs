//! Shape types drawn by the user
//!
//! - `Coordinate`: a latitude/longitude pair in fixed-point form
//! - `Rectangle`: an axis-aligned box normalized from four corners
//! - `Region`: the closed set of shapes the filter generator understands

use super::decimal::FixedDecimal;
use super::error::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// A single point on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub lat: FixedDecimal,
    pub lon: FixedDecimal,
}

impl Coordinate {
    /// Create a coordinate, validating range and finiteness
    pub fn new(lat: f64, lon: f64) -> GeometryResult<Self> {
        let (Some(fixed_lat), Some(fixed_lon)) =
            (FixedDecimal::from_f64(lat), FixedDecimal::from_f64(lon))
        else {
            return Err(GeometryError::NonFinite { lat, lon });
        };

        if lat.abs() > MAX_LATITUDE || lon.abs() > MAX_LONGITUDE {
            return Err(GeometryError::OutOfRange { lat, lon });
        }

        Ok(Self {
            lat: fixed_lat,
            lon: fixed_lon,
        })
    }

    /// Sort key: longitude first, then latitude
    fn lon_lat_key(&self) -> (FixedDecimal, FixedDecimal) {
        (self.lon, self.lat)
    }
}

/// An axis-aligned rectangle
///
/// Corners are stored sorted by (longitude, latitude):
/// `[min-lon/min-lat, min-lon/max-lat, max-lon/min-lat, max-lon/max-lat]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rectangle {
    corners: [Coordinate; 4],
}

impl Rectangle {
    /// Normalize a corner list into a rectangle.
    ///
    /// Duplicate points are dropped (a closed polygon ring repeats its first
    /// point), the rest sorted by (longitude, latitude). Exactly four
    /// distinct, axis-aligned corners must remain.
    pub fn from_corners(points: &[Coordinate]) -> GeometryResult<Self> {
        let mut distinct: Vec<Coordinate> = Vec::with_capacity(points.len());
        for point in points {
            if !distinct.contains(point) {
                distinct.push(*point);
            }
        }
        distinct.sort_by_key(Coordinate::lon_lat_key);

        let corners: [Coordinate; 4] = distinct
            .as_slice()
            .try_into()
            .map_err(|_| GeometryError::DegenerateCorners {
                found: distinct.len(),
            })?;

        let [sw, nw, se, ne] = corners;
        let aligned = sw.lon == nw.lon && se.lon == ne.lon && sw.lat == se.lat && nw.lat == ne.lat;
        if !aligned {
            return Err(GeometryError::NotAxisAligned);
        }

        Ok(Self { corners })
    }

    /// Build from bounds in degrees
    pub fn from_bounds(
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> GeometryResult<Self> {
        Self::from_corners(&[
            Coordinate::new(min_lat, min_lon)?,
            Coordinate::new(max_lat, min_lon)?,
            Coordinate::new(min_lat, max_lon)?,
            Coordinate::new(max_lat, max_lon)?,
        ])
    }

    /// Build from a GeoJSON-style ring of `[lon, lat]` positions
    pub fn from_ring(ring: &[[f64; 2]]) -> GeometryResult<Self> {
        let points = ring
            .iter()
            .map(|[lon, lat]| Coordinate::new(*lat, *lon))
            .collect::<GeometryResult<Vec<_>>>()?;
        Self::from_corners(&points)
    }

    /// Corners in canonical order
    pub fn corners(&self) -> &[Coordinate; 4] {
        &self.corners
    }

    pub fn min_lon(&self) -> FixedDecimal {
        self.corners[0].lon
    }

    pub fn max_lon(&self) -> FixedDecimal {
        self.corners[2].lon
    }

    pub fn min_lat(&self) -> FixedDecimal {
        self.corners[0].lat
    }

    pub fn max_lat(&self) -> FixedDecimal {
        self.corners[1].lat
    }

    /// Longitude extent: `corner[2].lon - corner[0].lon`
    pub fn lon_span(&self) -> FixedDecimal {
        self.corners[2].lon.distance(self.corners[0].lon)
    }

    /// Latitude extent: `corner[1].lat - corner[0].lat`
    pub fn lat_span(&self) -> FixedDecimal {
        self.corners[1].lat.distance(self.corners[0].lat)
    }

    /// Check whether a point lies inside or on the edge
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lat >= self.min_lat()
            && point.lat <= self.max_lat()
            && point.lon >= self.min_lon()
            && point.lon <= self.max_lon()
    }
}

/// A filter shape drawn on the map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Region {
    Rectangle(Rectangle),
}

impl Region {
    /// Shape name as reported by the drawing tool
    pub fn shape_name(&self) -> &'static str {
        match self {
            Region::Rectangle(_) => "Rectangle",
        }
    }
}

impl From<Rectangle> for Region {
    fn from(rectangle: Rectangle) -> Self {
        Region::Rectangle(rectangle)
    }
}

/// A shape as pushed by the drawing UI, before validation
///
/// `ring` holds `[lon, lat]` positions, GeoJSON order, optionally closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnShape {
    pub shape: String,
    pub ring: Vec<[f64; 2]>,
}

impl DrawnShape {
    /// A rectangle given by its bounds in degrees
    pub fn rectangle(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            shape: "Rectangle".to_string(),
            ring: vec![
                [min_lon, min_lat],
                [max_lon, min_lat],
                [max_lon, max_lat],
                [min_lon, max_lat],
                [min_lon, min_lat],
            ],
        }
    }

    /// Validate into a region
    pub fn to_region(&self) -> GeometryResult<Region> {
        match self.shape.as_str() {
            "Rectangle" => Rectangle::from_ring(&self.ring).map(Region::Rectangle),
            other => Err(GeometryError::UnsupportedShape(other.to_string())),
        }
    }
}
