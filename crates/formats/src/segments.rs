//! Normalizes transit geometries into the line segments that get drawn.

use crate::transit::{LonLat, TransitGeometry};

/// Line segments of a geometry, in source order.
///
/// A `LineString` yields one segment and a `MultiLineString` one per member
/// line. Anything else yields nothing. Segments are not validated: short
/// or empty lines are passed through as-is.
pub fn segments(geometry: &TransitGeometry) -> Vec<&[LonLat]> {
    match geometry {
        TransitGeometry::LineString(line) => vec![line.as_slice()],
        TransitGeometry::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
        TransitGeometry::Unsupported { .. } => Vec::new(),
    }
}

/// `[lon0, lat0, lon1, lat1, ...]`, the layout expected by
/// `foundation::math::positions_from_degrees_array`.
pub fn flatten_degrees(segment: &[LonLat]) -> Vec<f64> {
    segment.iter().flat_map(|p| [p[0], p[1]]).collect()
}
