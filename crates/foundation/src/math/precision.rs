//! Camera-relative precision.
//!
//! ECEF coordinates are ~6.4e6 m in magnitude, well past what `f32` can hold at
//! centimeter resolution. Everything handed to the GPU is expressed relative to
//! the camera eye in `f64` first and only then narrowed.

use super::Vec3;

/// GPU-friendly, camera-relative position.
pub type CameraRelativeF32 = [f32; 3];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraRelative {
    pub origin: Vec3,
}

impl CameraRelative {
    pub fn new(origin: Vec3) -> Self {
        Self { origin }
    }

    #[inline]
    pub fn to_f32(self, world: Vec3) -> CameraRelativeF32 {
        let d = world - self.origin;
        [d.x as f32, d.y as f32, d.z as f32]
    }
}
