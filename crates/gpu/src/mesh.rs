//! Corridor tessellation: a ribbon of constant width around a path, extruded
//! between two heights above the ellipsoid.

use earcutr::earcut;
use foundation::math::{EnuFrame, Vec3, ecef_to_geodetic, ellipsoid_normal};
use scene::components::CorridorGeometry;

/// Points closer than this (meters) are merged.
const MERGE_EPS_M: f64 = 1e-3;
/// Mitre length limit, as a multiple of the half width.
const MITRE_LIMIT: f64 = 4.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CorridorMesh {
    /// ECEF positions.
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Outline edges as a line list (pairs of ECEF points).
    pub outline: Vec<Vec3>,
}

impl CorridorMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

pub fn tessellate_corridor(corridor: &CorridorGeometry) -> CorridorMesh {
    let path = dedup(&corridor.positions);
    if path.len() < 2 || corridor.width.is_nan() || corridor.width <= 0.0 {
        return CorridorMesh::default();
    }

    let centroid = path.iter().fold(Vec3::ZERO, |acc, p| acc + *p) * (1.0 / path.len() as f64);
    let frame = EnuFrame::at(ecef_to_geodetic(centroid).with_alt(0.0));
    let local: Vec<[f64; 2]> = path
        .iter()
        .map(|p| {
            let l = frame.to_local(*p);
            [l[0], l[1]]
        })
        .collect();

    let Some((left, right)) = offset_sides(&local, 0.5 * corridor.width) else {
        return CorridorMesh::default();
    };

    // Outline ring: down the left side, back up the right side.
    let ring: Vec<[f64; 2]> = left.iter().chain(right.iter().rev()).copied().collect();
    let flat: Vec<f64> = ring.iter().flat_map(|p| [p[0], p[1]]).collect();
    let cap = match earcut(&flat, &[], 2) {
        Ok(ix) if !ix.is_empty() => ix,
        _ => return CorridorMesh::default(),
    };

    let lift = |p: [f64; 2], h: f64| {
        let g = ecef_to_geodetic(frame.to_world([p[0], p[1], 0.0]));
        g.with_alt(h).to_ecef()
    };
    let bottom: Vec<Vec3> = ring.iter().map(|p| lift(*p, corridor.bottom())).collect();
    let top: Vec<Vec3> = ring.iter().map(|p| lift(*p, corridor.top())).collect();

    let mut mesh = CorridorMesh::default();
    let n = ring.len() as u32;

    // Caps.
    for p in &top {
        mesh.positions.push(*p);
        mesh.normals.push(ellipsoid_normal(*p));
    }
    for p in &bottom {
        mesh.positions.push(*p);
        mesh.normals.push(-ellipsoid_normal(*p));
    }
    for tri in cap.chunks_exact(3) {
        let (a, b, c) = (tri[0] as u32, tri[1] as u32, tri[2] as u32);
        mesh.indices.extend_from_slice(&[a, b, c]);
        mesh.indices.extend_from_slice(&[n + a, n + c, n + b]);
    }

    // Walls, flat shaded.
    let outward_sign = if signed_area(&ring) >= 0.0 { 1.0 } else { -1.0 };
    for k in 0..ring.len() {
        let next = (k + 1) % ring.len();
        let d = [ring[next][0] - ring[k][0], ring[next][1] - ring[k][1]];
        let normal = frame
            .direction_to_world([d[1] * outward_sign, -d[0] * outward_sign, 0.0])
            .normalize();
        let base = mesh.positions.len() as u32;
        for p in [bottom[k], bottom[next], top[next], top[k]] {
            mesh.positions.push(p);
            mesh.normals.push(normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    if corridor.outline {
        for k in 0..ring.len() {
            let next = (k + 1) % ring.len();
            mesh.outline.extend_from_slice(&[top[k], top[next], bottom[k], bottom[next]]);
        }
        // Vertical edges at both ends of the corridor.
        let last = left.len() - 1;
        for k in [0, last, last + 1, ring.len() - 1] {
            mesh.outline.extend_from_slice(&[bottom[k], top[k]]);
        }
    }

    mesh
}

fn dedup(points: &[Vec3]) -> Vec<Vec3> {
    let mut out: Vec<Vec3> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| last.distance(*p) > MERGE_EPS_M) {
            out.push(*p);
        }
    }
    out
}

fn offset_sides(path: &[[f64; 2]], half_width: f64) -> Option<(Vec<[f64; 2]>, Vec<[f64; 2]>)> {
    let dirs: Vec<[f64; 2]> = path
        .windows(2)
        .map(|w| normalize2([w[1][0] - w[0][0], w[1][1] - w[0][1]]))
        .collect::<Option<_>>()?;

    let mut left = Vec::with_capacity(path.len());
    let mut right = Vec::with_capacity(path.len());
    for (i, p) in path.iter().enumerate() {
        let before = left_normal(dirs[i.saturating_sub(1)]);
        let after = left_normal(dirs[i.min(dirs.len() - 1)]);
        let (mitre, scale) = match normalize2([before[0] + after[0], before[1] + after[1]]) {
            Some(m) => {
                let cos = m[0] * after[0] + m[1] * after[1];
                (m, (1.0 / cos.max(1.0 / MITRE_LIMIT)) * half_width)
            }
            // Path doubles back on itself.
            None => (after, half_width),
        };
        left.push([p[0] + mitre[0] * scale, p[1] + mitre[1] * scale]);
        right.push([p[0] - mitre[0] * scale, p[1] - mitre[1] * scale]);
    }
    Some((left, right))
}

fn left_normal(d: [f64; 2]) -> [f64; 2] {
    [-d[1], d[0]]
}

fn normalize2(v: [f64; 2]) -> Option<[f64; 2]> {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    (len > 1e-12).then(|| [v[0] / len, v[1] / len])
}

fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let mut sum = 0.0;
    for k in 0..ring.len() {
        let a = ring[k];
        let b = ring[(k + 1) % ring.len()];
        sum += a[0] * b[1] - b[0] * a[1];
    }
    0.5 * sum
}
