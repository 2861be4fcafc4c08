use foundation::math::Vec3;
use scene::components::{Color, CorridorGeometry};

/// Look of a transit corridor. Distances in meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorridorStyle {
    pub width: f64,
    pub height: f64,
    pub extruded_height: f64,
    pub material: Color,
    pub outline: bool,
    pub outline_color: Color,
}

impl Default for CorridorStyle {
    /// Solid red, 15 m wide, spanning 20 m to 30 m above the ellipsoid.
    fn default() -> Self {
        Self {
            width: 15.0,
            height: 30.0,
            extruded_height: 20.0,
            material: Color::RED,
            outline: true,
            outline_color: Color::WHITE,
        }
    }
}

impl CorridorStyle {
    pub fn corridor(&self, positions: Vec<Vec3>) -> CorridorGeometry {
        CorridorGeometry {
            positions,
            width: self.width,
            height: self.height,
            extruded_height: self.extruded_height,
            material: self.material,
            outline: self.outline,
            outline_color: self.outline_color,
        }
    }
}
