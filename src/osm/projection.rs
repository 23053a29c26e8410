// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::f64::consts::FRAC_PI_4;

use crate::Point;

/// Equatorial radius of Earth used by the spherical (web) Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Geographic extent of a map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Returns the smallest Bounds containing all provided positions,
    /// or None if there are no positions.
    pub fn enclosing<I: IntoIterator<Item = (f64, f64)>>(positions: I) -> Option<Self> {
        positions.into_iter().fold(None, |acc, (lat, lon)| {
            Some(match acc {
                None => Self {
                    min_lat: lat,
                    min_lon: lon,
                    max_lat: lat,
                    max_lon: lon,
                },
                Some(b) => Self {
                    min_lat: b.min_lat.min(lat),
                    min_lon: b.min_lon.min(lon),
                    max_lat: b.max_lat.max(lat),
                    max_lon: b.max_lon.max(lon),
                },
            })
        })
    }
}

/// Converts geographic positions into normalized planar [Points](Point).
///
/// Positions are projected with spherical Mercator, shifted so that the south-west
/// corner of the map bounds lands at (0, 0), and divided by the shorter side of the bounds,
/// so that the map spans `[0, 1]` along its shorter axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    min_x: f64,
    min_y: f64,
    extent: f64,
    ground_factor: f64,
}

impl Projection {
    pub fn new(bounds: Bounds) -> Self {
        let min_x = mercator_x(bounds.min_lon);
        let min_y = mercator_y(bounds.min_lat);
        let dx = mercator_x(bounds.max_lon) - min_x;
        let dy = mercator_y(bounds.max_lat) - min_y;

        let mut extent = dx.min(dy);
        if !(extent.is_finite() && extent > 0.0) {
            log::warn!("degenerate map bounds {:?}, using unit extent", bounds);
            extent = 1.0;
        }

        // Mercator stretches distances by 1/cos(lat); undo that at the center of the map
        let center_lat = (bounds.min_lat + bounds.max_lat) * 0.5;

        Self {
            min_x,
            min_y,
            extent,
            ground_factor: center_lat.to_radians().cos(),
        }
    }

    /// Projects a geographic position.
    pub fn forward(&self, lat: f64, lon: f64) -> Point {
        Point::new(
            (mercator_x(lon) - self.min_x) / self.extent,
            (mercator_y(lat) - self.min_y) / self.extent,
        )
    }

    /// Converts a projected point back into a (latitude, longitude) pair.
    pub fn inverse(&self, pt: Point) -> (f64, f64) {
        let x = pt.x * self.extent + self.min_x;
        let y = pt.y * self.extent + self.min_y;
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
        (lat, lon)
    }

    /// Conversion factor from normalized units to meters on the ground.
    pub fn metric_scale(&self) -> f64 {
        self.extent * self.ground_factor
    }
}

fn mercator_x(lon: f64) -> f64 {
    lon.to_radians() * EARTH_RADIUS
}

fn mercator_y(lat: f64) -> f64 {
    (FRAC_PI_4 + lat.to_radians() * 0.5).tan().ln() * EARTH_RADIUS
}
