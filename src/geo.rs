//! Great-circle distance and bounding boxes.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for Bounds {
    /// Greater Kénitra.
    fn default() -> Self {
        Self {
            min_lat: 34.0,
            max_lat: 34.5,
            min_lon: -7.0,
            max_lon: -6.0,
        }
    }
}

impl Bounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Items within `radius_km` of a point, nearest first, paired with their distance.
pub fn within_radius<T>(
    items: impl IntoIterator<Item = T>,
    origin: (f64, f64),
    radius_km: f64,
    coords: impl Fn(&T) -> (f64, f64),
) -> Vec<(T, f64)> {
    let mut found: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let (lat, lon) = coords(&item);
            let distance = haversine_km(origin.0, origin.1, lat, lon);
            (item, distance)
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // Kénitra to Rabat.
        let d = haversine_km(34.261, -6.580, 34.020, -6.841);
        assert!((d - 36.0).abs() < 2.0, "got {}", d);
        assert_eq!(haversine_km(34.0, -6.5, 34.0, -6.5), 0.0);
    }

    #[test]
    fn test_default_bounds() {
        let bounds = Bounds::default();
        assert!(bounds.contains(34.26, -6.58));
        assert!(bounds.contains(34.0, -7.0));
        assert!(!bounds.contains(0.0, 0.0));
        assert!(!bounds.contains(33.99, -6.5));
    }

    #[test]
    fn test_within_radius_sorted_nearest_first() {
        let points = vec![("far", (34.30, -6.58)), ("near", (34.262, -6.58)), ("out", (35.0, -6.0))];
        let found = within_radius(points, (34.261, -6.58), 10.0, |p| p.1);
        let names: Vec<_> = found.iter().map(|(p, _)| p.0).collect();
        assert_eq!(names, ["near", "far"]);
        assert!(found[0].1 < found[1].1);
    }
}
