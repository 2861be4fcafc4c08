use foundation::math::{Geodetic, Vec3, geodetic_to_ecef};

/// Root bounding volume of a tileset, in the three 3D Tiles flavours.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BoundingVolume {
    /// Radians and meters above the ellipsoid.
    Region {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        min_height: f64,
        max_height: f64,
    },
    /// Oriented box: center plus the three half-axis vectors (ECEF meters).
    Box { center: Vec3, half_axes: [Vec3; 3] },
    Sphere { center: Vec3, radius: f64 },
}

impl BoundingVolume {
    pub fn center(&self) -> Vec3 {
        match *self {
            BoundingVolume::Region {
                west,
                south,
                east,
                north,
                min_height,
                max_height,
            } => geodetic_to_ecef(Geodetic::new(
                0.5 * (south + north),
                0.5 * (west + east),
                0.5 * (min_height + max_height),
            )),
            BoundingVolume::Box { center, .. } | BoundingVolume::Sphere { center, .. } => center,
        }
    }

    /// Eight corners, bottom face first (counter-clockwise), then the top face.
    ///
    /// Spheres report their axis-aligned enclosing cube.
    pub fn corners(&self) -> [Vec3; 8] {
        match *self {
            BoundingVolume::Region {
                west,
                south,
                east,
                north,
                min_height,
                max_height,
            } => {
                let at = |lon: f64, lat: f64, h: f64| geodetic_to_ecef(Geodetic::new(lat, lon, h));
                [
                    at(west, south, min_height),
                    at(east, south, min_height),
                    at(east, north, min_height),
                    at(west, north, min_height),
                    at(west, south, max_height),
                    at(east, south, max_height),
                    at(east, north, max_height),
                    at(west, north, max_height),
                ]
            }
            BoundingVolume::Box { center, half_axes } => {
                let [u, v, w] = half_axes;
                [
                    center - u - v - w,
                    center + u - v - w,
                    center + u + v - w,
                    center - u + v - w,
                    center - u - v + w,
                    center + u - v + w,
                    center + u + v + w,
                    center - u + v + w,
                ]
            }
            BoundingVolume::Sphere { center, radius } => {
                let axes = [
                    Vec3::new(radius, 0.0, 0.0),
                    Vec3::new(0.0, radius, 0.0),
                    Vec3::new(0.0, 0.0, radius),
                ];
                BoundingVolume::Box {
                    center,
                    half_axes: axes,
                }
                .corners()
            }
        }
    }

    /// The twelve edges of [`corners`](Self::corners) as index pairs.
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
}

#[cfg(test)]
mod tests {
    use super::BoundingVolume;
    use foundation::math::{Vec3, ecef_to_geodetic};

    #[test]
    fn box_corners_surround_center() {
        let center = Vec3::new(10.0, 20.0, 30.0);
        let volume = BoundingVolume::Box {
            center,
            half_axes: [
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 0.0, 3.0),
            ],
        };
        let corners = volume.corners();
        assert_eq!(corners[0], Vec3::new(9.0, 18.0, 27.0));
        assert_eq!(corners[6], Vec3::new(11.0, 22.0, 33.0));
        assert_eq!(volume.center(), center);
    }

    #[test]
    fn sphere_corners_are_cube() {
        let volume = BoundingVolume::Sphere {
            center: Vec3::ZERO,
            radius: 5.0,
        };
        for c in volume.corners() {
            assert_eq!(c.x.abs(), 5.0);
            assert_eq!(c.y.abs(), 5.0);
            assert_eq!(c.z.abs(), 5.0);
        }
    }

    #[test]
    fn region_center_is_inside_height_range() {
        let volume = BoundingVolume::Region {
            west: 0.07,
            south: 0.88,
            east: 0.08,
            north: 0.89,
            min_height: 0.0,
            max_height: 200.0,
        };
        let center = ecef_to_geodetic(volume.center());
        assert!((center.alt_m - 100.0).abs() < 1e-3);
        assert!((center.lat_rad - 0.885).abs() < 1e-10);
    }
}
