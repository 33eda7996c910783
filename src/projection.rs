//! Spherical Mercator (EPSG:900913) tile projection.
//!
//! Pixel coordinates grow east and north from the south-west corner of the
//! world at the given zoom level.

use std::f64::consts::PI;

use crate::types::{
    geom::{Meters, Pixel},
    track::LatLng,
};

pub const EARTH_RADIUS: f64 = 6378137.0;
pub const TILE_SIZE: f64 = 256.0;
pub const INITIAL_RESOLUTION: f64 = 2.0 * PI * EARTH_RADIUS / TILE_SIZE;
pub const ORIGIN_SHIFT: f64 = 2.0 * PI * EARTH_RADIUS / 2.0;

/// Metres per pixel at the equator
pub fn resolution(zoom: u8) -> f64 {
    INITIAL_RESOLUTION / 2f64.powi(zoom as i32)
}

/// WGS84 degrees to Spherical Mercator metres, without clamping
pub fn lat_lon_to_meters(point: LatLng) -> Meters {
    let x = point.longitude * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + point.latitude) * PI / 360.0).tan().ln() / (PI / 180.0);
    Meters {
        x,
        y: y * ORIGIN_SHIFT / 180.0,
    }
}

pub fn meters_to_pixels(meters: Meters, zoom: u8) -> Pixel {
    let res = resolution(zoom);
    Pixel {
        x: (meters.x + ORIGIN_SHIFT) / res,
        y: (meters.y + ORIGIN_SHIFT) / res,
    }
}

pub fn lat_lon_to_pixels(point: LatLng, zoom: u8) -> Pixel {
    meters_to_pixels(lat_lon_to_meters(point), zoom)
}

/// Pixel position of lat 0, lon 0
pub fn origin_pixels(zoom: u8) -> Pixel {
    lat_lon_to_pixels(LatLng::new(0.0, 0.0), zoom)
}
