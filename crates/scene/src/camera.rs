use foundation::math::{EnuFrame, Geodetic, Vec3, ecef_to_geodetic};

/// Lowest height the navigation controls will take the camera to (meters).
pub const MIN_CAMERA_HEIGHT_M: f64 = 10.0;

const MAX_PITCH_RAD: f64 = 89.0 * std::f64::consts::PI / 180.0;

/// Orientation in the local ENU frame of the camera position (radians).
///
/// Heading is clockwise from north, pitch is positive above the horizon.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading: f64, pitch: f64, roll: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), roll.to_radians())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub destination: Geodetic,
    pub orientation: HeadingPitchRoll,
}

impl CameraPose {
    pub fn new(destination: Geodetic, orientation: HeadingPitchRoll) -> Self {
        Self {
            destination,
            orientation,
        }
    }
}

impl Default for CameraPose {
    /// Looking straight down from 20 000 km over the prime meridian.
    fn default() -> Self {
        Self {
            destination: Geodetic::from_degrees(0.0, 0.0, 20_000_000.0),
            orientation: HeadingPitchRoll::from_degrees(0.0, -90.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    pose: CameraPose,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Eye position (ECEF meters).
    pub fn position(&self) -> Vec3 {
        self.pose.destination.to_ecef()
    }

    /// Height above the ellipsoid (meters).
    pub fn height(&self) -> f64 {
        self.pose.destination.alt_m
    }

    /// Unit view direction, right and up vectors (ECEF).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let frame = EnuFrame::at(self.pose.destination);
        let HeadingPitchRoll {
            heading,
            pitch,
            roll,
        } = self.pose.orientation;

        let (sh, ch) = heading.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        let dir = frame.direction_to_world([cp * sh, cp * ch, sp]);
        let right = frame.direction_to_world([ch, -sh, 0.0]);
        let up = right.cross(dir);

        let (sr, cr) = roll.sin_cos();
        let rolled_right = right * cr + up * sr;
        let rolled_up = up * cr - right * sr;
        (dir.normalize(), rolled_right.normalize(), rolled_up.normalize())
    }

    pub fn direction(&self) -> Vec3 {
        self.basis().0
    }

    /// Move along the view direction; negative values back away.
    ///
    /// The camera never goes below [`MIN_CAMERA_HEIGHT_M`].
    pub fn move_forward(&mut self, meters: f64) {
        let moved = self.position() + self.direction() * meters;
        let mut destination = ecef_to_geodetic(moved);
        if destination.alt_m < MIN_CAMERA_HEIGHT_M {
            destination.alt_m = MIN_CAMERA_HEIGHT_M;
        }
        self.pose.destination = destination;
    }

    /// Turn the camera in place.
    pub fn look(&mut self, delta_heading: f64, delta_pitch: f64) {
        let o = &mut self.pose.orientation;
        o.heading = (o.heading + delta_heading).rem_euclid(std::f64::consts::TAU);
        o.pitch = (o.pitch + delta_pitch).clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
    }
}
