//! 地理計算
//!
//! Great-circle distance and the spherical bounding box used to pick grid
//! cells for a radius query.

use driver_locator_common::types::{Coordinate, DistanceUnit};

/// Earth radius used for every distance, in meters (same value as Redis GEO).
pub const EARTH_RADIUS_M: f64 = 6_372_797.560_856;

/// Great-circle distance between two coordinates in meters (haversine).
pub fn haversine_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Distance between two coordinates expressed in `unit`.
pub fn distance(from: Coordinate, to: Coordinate, unit: DistanceUnit) -> f64 {
    unit.convert_meters(haversine_m(from, to))
}

/// A validated radius query.
///
/// Every store filters candidates through [`RadiusQuery::contains`], so the
/// inclusion rule is identical no matter how candidates were found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    /// 検索中心
    pub center: Coordinate,
    /// 半径（`unit` 単位）
    pub radius: f64,
    /// 距離単位
    pub unit: DistanceUnit,
}

impl RadiusQuery {
    /// Creates a query. Inputs are expected to be validated already.
    pub fn new(center: Coordinate, radius: f64, unit: DistanceUnit) -> Self {
        Self {
            center,
            radius,
            unit,
        }
    }

    /// Inclusive membership test: `distance <= radius`.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        distance(self.center, coordinate, self.unit) <= self.radius
    }

    /// Radius in meters.
    pub fn radius_m(&self) -> f64 {
        self.unit.to_meters(self.radius)
    }

    /// Latitude/longitude ranges guaranteed to enclose the query circle.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(self.center, self.radius_m())
    }
}

/// Degree ranges covering a circle on the sphere.
///
/// Longitude is split in two ranges when the circle crosses the antimeridian.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    /// 緯度範囲 (min, max)
    pub lat: (f64, f64),
    /// 経度範囲 (min, max) のリスト
    pub lon: Vec<(f64, f64)>,
}

impl BoundingBox {
    /// The whole globe.
    pub fn world() -> Self {
        Self {
            lat: (-90.0, 90.0),
            lon: vec![(-180.0, 180.0)],
        }
    }

    /// Bounding box of all points within `radius_m` of `center`.
    pub fn around(center: Coordinate, radius_m: f64) -> Self {
        let angular = radius_m / EARTH_RADIUS_M;
        if angular >= std::f64::consts::PI {
            return Self::world();
        }

        let angular_deg = angular.to_degrees();
        let lat_min = center.latitude - angular_deg;
        let lat_max = center.latitude + angular_deg;

        // The circle reaches a pole: every meridian is in range.
        if lat_min <= -90.0 || lat_max >= 90.0 {
            return Self {
                lat: (lat_min.max(-90.0), lat_max.min(90.0)),
                lon: vec![(-180.0, 180.0)],
            };
        }

        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if ratio >= 1.0 {
            return Self {
                lat: (lat_min, lat_max),
                lon: vec![(-180.0, 180.0)],
            };
        }
        let delta_lon = ratio.asin().to_degrees();
        let lon_min = center.longitude - delta_lon;
        let lon_max = center.longitude + delta_lon;

        let lon = if lon_min < -180.0 {
            vec![(lon_min + 360.0, 180.0), (-180.0, lon_max)]
        } else if lon_max > 180.0 {
            vec![(lon_min, 180.0), (-180.0, lon_max - 360.0)]
        } else {
            vec![(lon_min, lon_max)]
        };

        Self {
            lat: (lat_min, lat_max),
            lon,
        }
    }
}
