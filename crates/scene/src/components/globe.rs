use crate::components::{Color, NearFarScalar};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TerrainProvider {
    /// Smooth WGS84 ellipsoid, no elevation.
    #[default]
    Ellipsoid,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GlobeTranslucency {
    pub enabled: bool,
    pub front_face_alpha_by_distance: Option<NearFarScalar>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeSettings {
    pub terrain: TerrainProvider,
    pub base_color: Color,
    pub shadows: bool,
    pub depth_test_against_terrain: bool,
    pub translucency: GlobeTranslucency,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            terrain: TerrainProvider::Ellipsoid,
            base_color: Color::new(0.10, 0.55, 0.85, 1.0),
            shadows: false,
            depth_test_against_terrain: false,
            translucency: GlobeTranslucency::default(),
        }
    }
}

impl GlobeSettings {
    /// Front-face alpha at a camera distance (meters); opaque unless translucency is on.
    pub fn front_face_alpha(&self, distance: f64) -> f64 {
        match self.translucency {
            GlobeTranslucency {
                enabled: true,
                front_face_alpha_by_distance: Some(curve),
            } => curve.evaluate(distance),
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeSettings, GlobeTranslucency};
    use crate::components::NearFarScalar;

    #[test]
    fn opaque_until_translucency_enabled() {
        let mut globe = GlobeSettings::default();
        globe.translucency.front_face_alpha_by_distance =
            Some(NearFarScalar::new(100.0, 0.2, 100_000.0, 1.0));
        assert_eq!(globe.front_face_alpha(50.0), 1.0);

        globe.translucency = GlobeTranslucency {
            enabled: true,
            ..globe.translucency
        };
        assert_eq!(globe.front_face_alpha(50.0), 0.2);
    }
}
