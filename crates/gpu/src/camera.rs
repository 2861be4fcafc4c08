use foundation::math::{Vec3, WGS84_A};
use scene::camera::Camera;

pub const FOV_Y_RAD: f64 = std::f64::consts::FRAC_PI_3;

/// Matrices for one frame. The eye sits at the origin of render space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraMatrices {
    pub eye: Vec3,
    pub view_proj: [[f32; 4]; 4],
    pub near: f64,
    pub far: f64,
}

/// Straight-line distance to the horizon of a sphere of radius `WGS84_A`.
pub fn horizon_distance(height_m: f64) -> f64 {
    let h = height_m.max(0.0);
    (2.0 * WGS84_A * h + h * h).sqrt()
}

/// Depth range that keeps the ground close by and the horizon both in view.
pub fn near_far(height_m: f64) -> (f64, f64) {
    let near = (height_m * 0.02).clamp(0.5, 100_000.0);
    let far = (horizon_distance(height_m) * 1.5).max(near * 1_000.0);
    (near, far)
}

pub fn camera_matrices(camera: &Camera, aspect: f64) -> CameraMatrices {
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect.max(1e-6)
    } else {
        1.0
    };
    let (dir, _right, up) = camera.basis();
    let (near, far) = near_far(camera.height());

    let view = mat4_look_at_rh([0.0; 3], dir.as_array(), up.as_array());
    let proj = mat4_perspective_rh_z0(FOV_Y_RAD, aspect, near, far);
    CameraMatrices {
        eye: camera.position(),
        view_proj: mat4_mul(proj, view),
        near,
        far,
    }
}

pub fn mat4_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    // Column-major: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

/// Right-handed perspective, depth range `[0, 1]`, column-major.
pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> [[f32; 4]; 4] {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: [f64; 3], target: [f64; 3], up: [f64; 3]) -> [[f32; 4]; 4] {
    let eye = Vec3::new(eye[0], eye[1], eye[2]);
    let f = (Vec3::new(target[0], target[1], target[2]) - eye).normalize();
    let s = f.cross(Vec3::new(up[0], up[1], up[2])).normalize();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// `m * [p, 1]` followed by the perspective divide.
pub fn project(m: [[f32; 4]; 4], p: [f32; 3]) -> Option<[f32; 3]> {
    let mut out = [0.0f32; 4];
    for (row, value) in out.iter_mut().enumerate() {
        *value = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row];
    }
    if out[3] <= 0.0 {
        return None;
    }
    Some([out[0] / out[3], out[1] / out[3], out[2] / out[3]])
}
