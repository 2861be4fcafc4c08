use foundation::math::Vec3;

use crate::components::Color;

/// Extruded ribbon following a path on the ellipsoid.
///
/// `height` and `extruded_height` are both heights above the ellipsoid; the
/// volume spans whichever range they describe, in either order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorGeometry {
    pub positions: Vec<Vec3>,
    pub width: f64,
    pub height: f64,
    pub extruded_height: f64,
    pub material: Color,
    pub outline: bool,
    pub outline_color: Color,
}

impl CorridorGeometry {
    pub fn bottom(&self) -> f64 {
        self.height.min(self.extruded_height)
    }

    pub fn top(&self) -> f64 {
        self.height.max(self.extruded_height)
    }
}

#[cfg(test)]
mod tests {
    use super::CorridorGeometry;
    use crate::components::Color;

    #[test]
    fn bottom_and_top_ignore_order() {
        let c = CorridorGeometry {
            positions: Vec::new(),
            width: 15.0,
            height: 30.0,
            extruded_height: 20.0,
            material: Color::RED,
            outline: true,
            outline_color: Color::WHITE,
        };
        assert_eq!(c.bottom(), 20.0);
        assert_eq!(c.top(), 30.0);
    }
}
