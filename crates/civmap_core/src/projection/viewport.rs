//! Map viewport settings handed to the tile renderer.
//!
//! # Invariants
//! - The world is bounded to latitude [-90, 90] and longitude [-180, 180].
//! - `min_zoom <= initial_zoom <= max_zoom`.

use crate::model::civilization::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

pub const OSM_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// South-west / north-east bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn world() -> Self {
        Self {
            south_west: LatLng::new(MIN_LATITUDE, MIN_LONGITUDE),
            north_east: LatLng::new(MAX_LATITUDE, MAX_LONGITUDE),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&point.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&point.longitude)
    }

    pub fn clamp(&self, point: LatLng) -> LatLng {
        LatLng::new(
            point
                .latitude
                .clamp(self.south_west.latitude, self.north_east.latitude),
            point
                .longitude
                .clamp(self.south_west.longitude, self.north_east.longitude),
        )
    }
}

/// Fixed map view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewport {
    pub center: LatLng,
    pub initial_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub max_bounds: Bounds,
    /// 1.0 makes the bounds fully solid while dragging.
    pub max_bounds_viscosity: f64,
    pub tile_url_template: String,
    pub attribution: String,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            initial_zoom: 2,
            min_zoom: 2,
            max_zoom: 5,
            max_bounds: Bounds::world(),
            max_bounds_viscosity: 1.0,
            tile_url_template: OSM_TILE_TEMPLATE.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

impl MapViewport {
    pub fn contains(&self, point: LatLng) -> bool {
        self.max_bounds.contains(point)
    }

    /// Clamps a point into the viewport bounds. NaN components collapse to
    /// the center.
    pub fn clamp(&self, point: LatLng) -> LatLng {
        let point = LatLng::new(
            finite_or(point.latitude, self.center.latitude),
            finite_or(point.longitude, self.center.longitude),
        );
        self.max_bounds.clamp(point)
    }

    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLng, MapViewport};

    #[test]
    fn default_viewport_matches_world_map_settings() {
        let viewport = MapViewport::default();
        assert_eq!(viewport.center, LatLng::new(0.0, 0.0));
        assert_eq!(viewport.initial_zoom, 2);
        assert_eq!((viewport.min_zoom, viewport.max_zoom), (2, 5));
        assert_eq!(viewport.max_bounds_viscosity, 1.0);
        assert!(viewport.tile_url_template.contains("openstreetmap"));
    }

    #[test]
    fn clamp_pins_points_and_zoom_into_range() {
        let viewport = MapViewport::default();
        assert_eq!(
            viewport.clamp(LatLng::new(95.0, -200.0)),
            LatLng::new(90.0, -180.0)
        );
        assert_eq!(
            viewport.clamp(LatLng::new(f64::NAN, f64::INFINITY)),
            LatLng::new(0.0, 180.0)
        );
        assert_eq!(viewport.clamp_zoom(0), 2);
        assert_eq!(viewport.clamp_zoom(9), 5);
        assert!(viewport.contains(LatLng::new(-90.0, 180.0)));
        assert!(!viewport.contains(LatLng::new(-90.5, 0.0)));
    }
}
