//! Map coordinates and bounding boxes.

#[cfg(test)]
#[path = "geo_test.rs"]
mod geo_test;

use serde::{Deserialize, Serialize};

use crate::model::Point;

/// Tolerance in degrees below which an incident marker is not moved (about 10 meters).
pub const POSITION_TOLERANCE: f64 = 1e-4;

/// A resolved map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Resolve an API point. Returns `None` if either component is not finite.
    #[must_use]
    pub fn from_point(point: &Point) -> Option<Self> {
        if point.latitude.is_finite() && point.longitude.is_finite() {
            Some(Self::new(point.latitude, point.longitude))
        } else {
            None
        }
    }

    /// True if both components differ by at most `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &LatLng, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

/// Axis-aligned bounding box that grows to include every extended point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    corners: Option<(LatLng, LatLng)>,
}

impl Bounds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the box to include `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.corners = Some(match self.corners {
            None => (point, point),
            Some((sw, ne)) => (
                LatLng::new(sw.lat.min(point.lat), sw.lng.min(point.lng)),
                LatLng::new(ne.lat.max(point.lat), ne.lng.max(point.lng)),
            ),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corners.is_none()
    }

    #[must_use]
    pub fn south_west(&self) -> Option<LatLng> {
        self.corners.map(|(sw, _)| sw)
    }

    #[must_use]
    pub fn north_east(&self) -> Option<LatLng> {
        self.corners.map(|(_, ne)| ne)
    }

    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        self.corners.is_some_and(|(sw, ne)| {
            point.lat >= sw.lat && point.lat <= ne.lat && point.lng >= sw.lng && point.lng <= ne.lng
        })
    }

    /// Midpoint of the box, if any point has been added.
    #[must_use]
    pub fn center(&self) -> Option<LatLng> {
        self.corners
            .map(|(sw, ne)| LatLng::new((sw.lat + ne.lat) / 2.0, (sw.lng + ne.lng) / 2.0))
    }
}
