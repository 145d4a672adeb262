//! Geospatial ranking.
//!
//! Distances are great-circle (haversine) distances in meters on a sphere of
//! radius [`EARTH_RADIUS_METERS`]. Callers decide which places are eligible;
//! this module only measures, filters by radius and orders.

use crate::core::error::AppError;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Results returned by the nearest search
pub const NEAREST_LIMIT: usize = 50;

/// Results returned by the same-category nearby search
pub const NEARBY_PLACE_LIMIT: usize = 50;

pub const NEARBY_PLACE_RADIUS_METERS: f64 = 100_000.0;

/// Keyword matches fetched before distance filtering
pub const KEYWORD_CANDIDATE_LIMIT: i64 = 100;

pub const KEYWORD_RADIUS_METERS: f64 = 300.0 * 1000.0;

/// Results returned by the AR search
pub const AR_LIMIT: usize = 3;

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validate a client-supplied position. Longitude is normalised first, so
    /// `190` becomes `-170`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let longitude = normalize_longitude(longitude);

        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!(
                "Invalid latitude: {}",
                latitude
            )));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "Invalid longitude: {}",
                longitude
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Single wrap into [-180, 180]; values more than one turn out stay invalid
pub fn normalize_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        longitude - 360.0
    } else if longitude < -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// A candidate with its distance from the search origin
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_meters: f64,
}

/// Order candidates by distance from `origin`.
///
/// Candidates strictly farther than `radius_meters` are dropped, the rest are
/// sorted ascending (stable, so equal distances keep input order) and the
/// first `max_results` are returned.
pub fn rank_by_distance<T>(
    origin: Coordinate,
    candidates: impl IntoIterator<Item = (T, Coordinate)>,
    radius_meters: Option<f64>,
    max_results: usize,
) -> Vec<Ranked<T>> {
    let mut ranked: Vec<Ranked<T>> = candidates
        .into_iter()
        .map(|(item, position)| Ranked {
            item,
            distance_meters: distance_meters(origin, position),
        })
        .filter(|r| radius_meters.map_or(true, |radius| r.distance_meters <= radius))
        .collect();

    ranked.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    ranked.truncate(max_results);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    const JAKARTA: (f64, f64) = (-6.2088, 106.8456);
    const BANDUNG: (f64, f64) = (-6.9175, 107.6191);

    #[test]
    fn test_jakarta_to_bandung() {
        let d = distance_meters(coord(JAKARTA.0, JAKARTA.1), coord(BANDUNG.0, BANDUNG.1));
        assert!(d > 110_000.0 && d < 125_000.0, "distance was {}", d);
    }

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        let points = [
            coord(JAKARTA.0, JAKARTA.1),
            coord(BANDUNG.0, BANDUNG.1),
            coord(0.0, 179.9),
            coord(0.0, -179.9),
            coord(89.9, 10.0),
        ];

        for a in points {
            assert!(distance_meters(a, a) < 1.0);
            for b in points {
                assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_distance_across_antimeridian_is_short() {
        let d = distance_meters(coord(0.0, 179.9), coord(0.0, -179.9));
        assert!(d < 25_000.0, "distance was {}", d);
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(45.5), 45.5);
    }

    #[test]
    fn test_coordinate_validation() {
        assert_eq!(coord(10.0, 190.0).longitude, -170.0);
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 600.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let origin = coord(JAKARTA.0, JAKARTA.1);
        let candidates = vec![
            ("bandung", coord(BANDUNG.0, BANDUNG.1)),
            ("monas", coord(-6.1754, 106.8272)),
            ("surabaya", coord(-7.2575, 112.7521)),
            ("bogor", coord(-6.5971, 106.8060)),
        ];

        let ranked = rank_by_distance(origin, candidates.clone(), None, 10);
        let names: Vec<&str> = ranked.iter().map(|r| r.item).collect();
        assert_eq!(names, vec!["monas", "bogor", "bandung", "surabaya"]);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));

        let top_two = rank_by_distance(origin, candidates, None, 2);
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[1].item, "bogor");
    }

    #[test]
    fn test_rank_drops_candidates_beyond_radius() {
        let origin = coord(JAKARTA.0, JAKARTA.1);
        let candidates = vec![
            ("bandung", coord(BANDUNG.0, BANDUNG.1)),
            ("bogor", coord(-6.5971, 106.8060)),
            ("surabaya", coord(-7.2575, 112.7521)),
        ];

        let ranked = rank_by_distance(origin, candidates, Some(NEARBY_PLACE_RADIUS_METERS), 50);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item, "bogor");
        assert!(ranked
            .iter()
            .all(|r| r.distance_meters <= NEARBY_PLACE_RADIUS_METERS));

        // A wider radius keeps Bandung but still drops Surabaya
        let wide = rank_by_distance(
            origin,
            vec![
                ("bandung", coord(BANDUNG.0, BANDUNG.1)),
                ("surabaya", coord(-7.2575, 112.7521)),
            ],
            Some(KEYWORD_RADIUS_METERS),
            usize::MAX,
        );
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].item, "bandung");
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let origin = coord(0.0, 0.0);
        let same = coord(1.0, 1.0);
        let ranked = rank_by_distance(origin, vec![(1, same), (2, same), (3, same)], None, 10);
        let ids: Vec<i32> = ranked.iter().map(|r| r.item).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_empty_input() {
        let ranked: Vec<Ranked<u8>> = rank_by_distance(coord(0.0, 0.0), vec![], Some(10.0), 5);
        assert!(ranked.is_empty());
    }
}
