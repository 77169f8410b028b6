//! Static region coordinates and great-circle distance.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::context::UserLocation;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate datacenter coordinates (latitude, longitude) per region code.
static REGION_COORDINATES: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("us-east", (38.9, -77.4)),
        ("us-east-1", (38.9, -77.4)),
        ("us-east-2", (40.0, -83.0)),
        ("us-west", (37.4, -122.0)),
        ("us-west-1", (37.4, -122.0)),
        ("us-west-2", (45.8, -119.7)),
        ("ca-central", (45.5, -73.6)),
        ("sa-east", (-23.5, -46.6)),
        ("eu-west", (53.3, -6.3)),
        ("eu-west-1", (53.3, -6.3)),
        ("eu-west-2", (51.5, -0.1)),
        ("eu-central", (50.1, 8.7)),
        ("eu-central-1", (50.1, 8.7)),
        ("eu-north", (59.3, 18.1)),
        ("me-south", (26.1, 50.6)),
        ("af-south", (-33.9, 18.4)),
        ("ap-south", (19.1, 72.9)),
        ("ap-south-1", (19.1, 72.9)),
        ("ap-southeast", (1.3, 103.8)),
        ("ap-southeast-1", (1.3, 103.8)),
        ("ap-southeast-2", (-33.9, 151.2)),
        ("ap-northeast", (35.7, 139.7)),
        ("ap-northeast-1", (35.7, 139.7)),
        ("ap-east", (22.3, 114.2)),
    ])
});

/// Coordinates of a known region code, case-insensitively.
pub fn region_coordinates(region: &str) -> Option<(f64, f64)> {
    REGION_COORDINATES
        .get(region.to_ascii_lowercase().as_str())
        .copied()
}

/// Resolves a caller location to coordinates, if it is known.
pub fn location_coordinates(location: &UserLocation) -> Option<(f64, f64)> {
    match location {
        UserLocation::Region(code) => region_coordinates(code),
        UserLocation::Coordinates {
            latitude,
            longitude,
        } if latitude.is_finite() && longitude.is_finite() => Some((*latitude, *longitude)),
        UserLocation::Coordinates { .. } => None,
    }
}

/// Haversine distance in kilometres.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_resolve_case_insensitively() {
        assert!(region_coordinates("US-EAST").is_some());
        assert!(region_coordinates("mars-north").is_none());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = (38.9, -77.4);
        assert!(distance_km(p, p) < 1e-9);
    }

    #[test]
    fn london_is_closer_to_dublin_than_virginia() {
        let london = (51.5, -0.1);
        let dublin = region_coordinates("eu-west").unwrap();
        let virginia = region_coordinates("us-east").unwrap();
        assert!(distance_km(london, dublin) < distance_km(london, virginia));
    }

    #[test]
    fn non_finite_coordinates_are_unknown() {
        let loc = UserLocation::Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(location_coordinates(&loc).is_none());
    }
}
