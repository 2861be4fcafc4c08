use super::{Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up tangent frame anchored at a geodetic origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EnuFrame {
    pub origin: Vec3,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl EnuFrame {
    pub fn at(origin: Geodetic) -> Self {
        let sin_lat = origin.lat_rad.sin();
        let cos_lat = origin.lat_rad.cos();
        let sin_lon = origin.lon_rad.sin();
        let cos_lon = origin.lon_rad.cos();

        Self {
            origin: geodetic_to_ecef(origin),
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    /// ECEF point to local `[east, north, up]` meters.
    pub fn to_local(&self, point: Vec3) -> [f64; 3] {
        let d = point - self.origin;
        [d.dot(self.east), d.dot(self.north), d.dot(self.up)]
    }

    pub fn to_world(&self, local: [f64; 3]) -> Vec3 {
        self.origin + self.east * local[0] + self.north * local[1] + self.up * local[2]
    }

    /// Local direction (no translation) to ECEF.
    pub fn direction_to_world(&self, local: [f64; 3]) -> Vec3 {
        self.east * local[0] + self.north * local[1] + self.up * local[2]
    }
}

#[cfg(test)]
mod tests {
    use super::EnuFrame;
    use crate::math::Geodetic;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn round_trip_in_brussels() {
        let frame = EnuFrame::at(Geodetic::from_degrees(4.35, 50.85, 0.0));
        let local = [15.0, -8.0, 2.5];
        let back = frame.to_local(frame.to_world(local));
        for i in 0..3 {
            assert_close(back[i], local[i], 1e-6);
        }
    }

    #[test]
    fn basis_is_orthonormal() {
        let frame = EnuFrame::at(Geodetic::from_degrees(-73.0, 40.0, 0.0));
        assert_close(frame.east.dot(frame.north), 0.0, 1e-12);
        assert_close(frame.north.dot(frame.up), 0.0, 1e-12);
        assert_close(frame.east.cross(frame.north).dot(frame.up), 1.0, 1e-12);
    }

    #[test]
    fn origin_maps_to_zero() {
        let origin = Geodetic::new(0.1, -0.2, 35.0);
        let frame = EnuFrame::at(origin);
        let local = frame.to_local(origin.to_ecef());
        for v in local {
            assert_close(v, 0.0, 1e-9);
        }
    }
}
