use geo::{
    Area, BoundingRect, Centroid, ConcaveHull, ConvexHull, Coord, CoordsIter, EuclideanDistance,
    Geometry, MultiPoint, Point, Polygon,
};

/// Meters per degree of latitude, and per degree of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Number of segments used to approximate a buffer circle.
const CIRCLE_SEGMENTS: usize = 32;

/// Converts meters to degrees latitude/longitude at the specified origin
/// latitude.
///
/// Average of the latitudinal and longitudinal conversion factors; a local
/// approximation, not geodesically exact.
pub fn meters_to_degrees(meters: f64, origin_latitude: f64) -> f64 {
    let lat = meters / METERS_PER_DEGREE;
    let lon = meters / (METERS_PER_DEGREE * origin_latitude.to_radians().cos());
    (lat + lon) / 2.0
}

/// Expands every coordinate of a geometry into a circle of the given radius,
/// returning the source coordinates plus all circle coordinates.
pub fn buffered_coords(geometry: &Geometry<f64>, radius_degrees: f64) -> Vec<Coord<f64>> {
    let mut coords = Vec::new();
    for center in geometry.coords_iter() {
        coords.push(center);
        for k in 0..CIRCLE_SEGMENTS {
            let theta = std::f64::consts::TAU * k as f64 / CIRCLE_SEGMENTS as f64;
            coords.push(Coord {
                x: center.x + radius_degrees * theta.cos(),
                y: center.y + radius_degrees * theta.sin(),
            });
        }
    }
    coords
}

/// Buffers a geometry by a radius in degrees, returning the convex hull of
/// the expanded coordinate cloud.
///
/// Exact for points; conservative (convex) for other shapes. Returns `None`
/// for empty or degenerate geometries.
pub fn buffer_geometry(geometry: &Geometry<f64>, radius_degrees: f64) -> Option<Polygon<f64>> {
    let coords = buffered_coords(geometry, radius_degrees);
    if coords.len() < 3 {
        return None;
    }
    let hull = to_multi_point(&coords).convex_hull();
    if is_degenerate(&hull) {
        None
    } else {
        Some(hull)
    }
}

/// Builds a hull polygon over a coordinate cloud.
///
/// Tries the concave hull first; if the result is degenerate, falls back to
/// the convex hull and retries the concave hull on that. Returns `None` only
/// when the convex hull itself is degenerate.
pub fn hull_of(coords: &[Coord<f64>], concavity: f64) -> Option<Polygon<f64>> {
    if coords.len() < 3 {
        return None;
    }
    let cloud = to_multi_point(coords);

    let concave = cloud.concave_hull(concavity);
    if !is_degenerate(&concave) {
        return Some(concave);
    }

    let convex = cloud.convex_hull();
    if is_degenerate(&convex) {
        return None;
    }

    let retry = MultiPoint::from(convex.exterior().points().collect::<Vec<_>>())
        .concave_hull(concavity);
    if is_degenerate(&retry) {
        Some(convex)
    } else {
        Some(retry)
    }
}

/// Latitude of a geometry's centroid, if it has one.
pub fn centroid_latitude(geometry: &Geometry<f64>) -> Option<f64> {
    geometry.centroid().map(|p| p.y())
}

/// Half the diagonal of a geometry's bounding rectangle, in degrees.
///
/// Zero for points and empty geometries.
pub fn half_diagonal(geometry: &Geometry<f64>) -> f64 {
    match geometry.bounding_rect() {
        Some(rect) => {
            let dx = (rect.max().x - rect.min().x) / 2.0;
            let dy = (rect.max().y - rect.min().y) / 2.0;
            (dx * dx + dy * dy).sqrt()
        }
        None => 0.0,
    }
}

/// Minimum euclidean distance from any vertex of `geometry` to `polygon`.
///
/// Zero when a vertex lies inside the polygon. Exact for point geometries;
/// an upper bound for shapes whose edges pass closer than their vertices.
pub fn vertex_distance(geometry: &Geometry<f64>, polygon: &Polygon<f64>) -> Option<f64> {
    geometry
        .coords_iter()
        .map(|c| Point::from(c).euclidean_distance(polygon))
        .fold(None, |best: Option<f64>, d| {
            Some(best.map_or(d, |b| b.min(d)))
        })
}

fn to_multi_point(coords: &[Coord<f64>]) -> MultiPoint<f64> {
    MultiPoint::from(coords.iter().copied().map(Point::from).collect::<Vec<_>>())
}

/// A polygon with fewer than four ring coordinates, zero area, or non-finite
/// coordinates cannot serve as a footprint or buffer.
fn is_degenerate(polygon: &Polygon<f64>) -> bool {
    let exterior = polygon.exterior();
    if exterior.0.len() < 4 {
        return true;
    }
    if exterior.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return true;
    }
    polygon.unsigned_area() == 0.0
}
