//! Globe surface geometry around the camera.
//!
//! A full-sphere mesh is far too coarse at street level, so the visible cap
//! below the camera is rebuilt every frame: concentric rings spaced
//! geometrically from the nadir out to a little past the horizon.

use foundation::math::{
    EnuFrame, Geodetic, Vec3, WGS84_A, ecef_to_geodetic, ellipsoid_normal, geodetic_to_ecef,
};

pub const PATCH_RINGS: u32 = 48;
pub const PATCH_SEGMENTS: u32 = 96;

/// Innermost ring radius (meters on the ground).
const MIN_RING_M: f64 = 5.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlobePatch {
    /// ECEF points on the ellipsoid. The first one is the nadir.
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Central angle from the nadir to the horizon seen from `height_m`.
pub fn horizon_angle(height_m: f64) -> f64 {
    let h = height_m.max(0.0);
    (WGS84_A / (WGS84_A + h)).acos()
}

pub fn globe_patch(eye: Vec3, rings: u32, segments: u32) -> GlobePatch {
    let rings = rings.max(2);
    let segments = segments.max(3);

    let nadir = ecef_to_geodetic(eye);
    let frame = EnuFrame::at(nadir.with_alt(0.0));
    let up = frame.origin.normalize();

    let outer = (horizon_angle(nadir.alt_m) * 1.1 + 1e-3).min(std::f64::consts::FRAC_PI_2);
    let inner = (MIN_RING_M / WGS84_A).min(outer * 0.5);

    let mut patch = GlobePatch::default();
    patch.positions.push(frame.origin);
    patch.normals.push(ellipsoid_normal(frame.origin));

    for ring in 0..rings {
        let t = ring as f64 / (rings - 1) as f64;
        let theta = inner * (outer / inner).powf(t);
        let (sin_t, cos_t) = theta.sin_cos();
        for seg in 0..segments {
            let phi = seg as f64 / segments as f64 * std::f64::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let dir = up * cos_t + (frame.east * cos_p + frame.north * sin_p) * sin_t;
            let p = on_ellipsoid(dir);
            patch.positions.push(p);
            patch.normals.push(ellipsoid_normal(p));
        }
    }

    // Fan around the nadir.
    for seg in 0..segments {
        let a = 1 + seg;
        let b = 1 + (seg + 1) % segments;
        patch.indices.extend_from_slice(&[0, a, b]);
    }
    for ring in 0..rings - 1 {
        let base = 1 + ring * segments;
        let next = base + segments;
        for seg in 0..segments {
            let s1 = (seg + 1) % segments;
            let (i0, i1) = (base + seg, base + s1);
            let (i2, i3) = (next + seg, next + s1);
            patch.indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    patch
}

/// Ellipsoid surface point along a geocentric direction.
fn on_ellipsoid(dir: Vec3) -> Vec3 {
    let g = ecef_to_geodetic(dir * WGS84_A);
    geodetic_to_ecef(g.with_alt(0.0))
}

/// Meridians and parallels as a line list (pairs of ECEF points) on the ellipsoid.
pub fn graticule_lines(step_deg: f64) -> Vec<Vec3> {
    let step = if step_deg.is_finite() && step_deg >= 1.0 {
        step_deg
    } else {
        15.0
    };
    let samples = 180;
    let mut out = Vec::new();
    let mut push_polyline = |points: Vec<Vec3>| {
        for pair in points.windows(2) {
            out.push(pair[0]);
            out.push(pair[1]);
        }
    };

    let mut lon = -180.0;
    while lon < 180.0 {
        push_polyline(
            (0..=samples)
                .map(|i| {
                    let lat = -90.0 + 180.0 * i as f64 / samples as f64;
                    geodetic_to_ecef(Geodetic::from_degrees(lon, lat, 0.0))
                })
                .collect(),
        );
        lon += step;
    }

    let mut lat = -90.0 + step;
    while lat < 90.0 {
        push_polyline(
            (0..=2 * samples)
                .map(|i| {
                    let lon = -180.0 + 360.0 * i as f64 / (2 * samples) as f64;
                    geodetic_to_ecef(Geodetic::from_degrees(lon, lat, 0.0))
                })
                .collect(),
        );
        lat += step;
    }

    out
}
