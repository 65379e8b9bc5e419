use crate::constants::{
    EARTH_RADIUS_METERS, GRID_CELL_DEGREES, MAX_QUERY_RADIUS_METERS, METERS_PER_DEGREE,
};

/// Cell counts for the full globe at `GRID_CELL_DEGREES` resolution:
/// 180 degrees of latitude and 360 of longitude.
const LAT_CELL_COUNT: i64 = 18_000;
const LON_CELL_COUNT: i64 = 36_000;

/// Maps an unbounded east-west cell offset back into the globe's
/// `-18_000..18_000` range, so coverage wraps at the antimeridian.
fn wrap_lon_cell(cell: i64) -> i32 {
    let mut wrapped = cell.rem_euclid(LON_CELL_COUNT);
    if wrapped >= LON_CELL_COUNT / 2 {
        wrapped -= LON_CELL_COUNT;
    }
    wrapped as i32
}

/// Great-circle distance in meters between two lat/long points (haversine).
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

pub fn valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

/// Grid cell holding a coordinate, keyed by truncated lat/long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub lat_cell: i32,
    pub lon_cell: i32,
}

impl CellKey {
    pub fn for_point(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_cell: (latitude / GRID_CELL_DEGREES).floor() as i32,
            // Wrapping keeps +180 and -180 in the same cell.
            lon_cell: wrap_lon_cell((longitude / GRID_CELL_DEGREES).floor() as i64),
        }
    }
}

/// All cells whose contents could lie within `radius_meters` of the center.
/// Longitude degrees shrink with latitude, so the east-west span widens
/// toward the poles. The radius is clamped to `MAX_QUERY_RADIUS_METERS` and
/// the spans to the whole-globe cell range, so a single call can never
/// enumerate an unbounded grid. East-west offsets wrap at the antimeridian;
/// a full-wrap span may repeat one column, which only costs a re-lookup.
pub fn covering_cells(latitude: f64, longitude: f64, radius_meters: f64) -> Vec<CellKey> {
    let radius_meters = radius_meters.clamp(0.0, MAX_QUERY_RADIUS_METERS);
    let center = CellKey::for_point(latitude, longitude);

    let lat_span_degrees = radius_meters / METERS_PER_DEGREE;
    let meters_per_lon_degree = (METERS_PER_DEGREE * latitude.to_radians().cos()).max(1.0);
    let lon_span_degrees = radius_meters / meters_per_lon_degree;

    let lat_cells = ((lat_span_degrees / GRID_CELL_DEGREES).ceil() as i64).min(LAT_CELL_COUNT / 2);
    let lon_cells = ((lon_span_degrees / GRID_CELL_DEGREES).ceil() as i64).min(LON_CELL_COUNT / 2);

    let mut cells = Vec::new();
    for d_lat in -lat_cells..=lat_cells {
        for d_lon in -lon_cells..=lon_cells {
            cells.push(CellKey {
                lat_cell: center.lat_cell + d_lat as i32,
                lon_cell: wrap_lon_cell(center.lon_cell as i64 + d_lon),
            });
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_coincident_points() {
        assert_eq!(haversine_meters(40.7484, -73.9857, 40.7484, -73.9857), 0.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Empire State Building to Times Square, roughly 1.1 km.
        let d = haversine_meters(40.7484, -73.9857, 40.7580, -73.9855);
        assert!((1000.0..1200.0).contains(&d), "got {d}");
    }

    #[test]
    fn coordinate_validation_bounds() {
        assert!(valid_latitude(90.0));
        assert!(valid_latitude(-90.0));
        assert!(!valid_latitude(90.01));
        assert!(!valid_latitude(f64::NAN));
        assert!(valid_longitude(-180.0));
        assert!(!valid_longitude(180.5));
    }

    #[test]
    fn covering_cells_include_center_and_neighbors() {
        let center = CellKey::for_point(40.7484, -73.9857);
        let cells = covering_cells(40.7484, -73.9857, 1500.0);
        assert!(cells.contains(&center));
        assert!(cells.contains(&CellKey {
            lat_cell: center.lat_cell + 1,
            lon_cell: center.lon_cell - 1,
        }));
    }

    #[test]
    fn zero_radius_still_covers_center_cell() {
        let cells = covering_cells(40.7484, -73.9857, 0.0);
        assert_eq!(cells, vec![CellKey::for_point(40.7484, -73.9857)]);
    }

    #[test]
    fn coverage_stays_bounded_for_oversized_radii() {
        // Radii beyond the city preset are clamped before the grid is built,
        // so even absurd inputs cannot blow up the cell enumeration.
        let equator = covering_cells(0.0, 0.0, 2_000_000.0);
        assert!(equator.len() < 100_000, "got {} cells", equator.len());
        assert_eq!(equator.len(), covering_cells(0.0, 0.0, f64::MAX).len());

        let midlatitude = covering_cells(40.7484, -73.9857, 1e12);
        assert!(midlatitude.len() < 100_000, "got {} cells", midlatitude.len());
    }

    #[test]
    fn coverage_wraps_across_the_antimeridian() {
        // Two points straddling the date line are ~220 m apart.
        let cells = covering_cells(0.0, 179.999, 500.0);
        assert!(cells.contains(&CellKey::for_point(0.0, -179.999)));
    }

    #[test]
    fn longitude_cell_is_shared_at_both_date_line_edges() {
        assert_eq!(
            CellKey::for_point(0.0, 180.0),
            CellKey::for_point(0.0, -180.0)
        );
    }
}
