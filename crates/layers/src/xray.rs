//! Surface / X-Ray presentation of the globe and streamed tilesets.

use scene::Scene;
use scene::components::{NearFarScalar, TileStyle, TilesetPrimitive};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VisibilityMode {
    #[default]
    Surface,
    /// X-Ray: the surface turns see-through up close.
    Underground,
}

const NEAR_M: f64 = 100.0;
const FAR_M: f64 = 100_000.0;

impl VisibilityMode {
    pub fn toggled(self) -> Self {
        match self {
            VisibilityMode::Surface => VisibilityMode::Underground,
            VisibilityMode::Underground => VisibilityMode::Surface,
        }
    }

    pub fn is_underground(self) -> bool {
        self == VisibilityMode::Underground
    }

    /// Globe front-face alpha curve for this mode.
    pub fn globe_alpha_by_distance(self) -> NearFarScalar {
        let near_alpha = match self {
            VisibilityMode::Surface => 1.0,
            VisibilityMode::Underground => 0.2,
        };
        NearFarScalar::new(NEAR_M, near_alpha, FAR_M, 1.0)
    }

    pub fn tile_style(self) -> TileStyle {
        match self {
            VisibilityMode::Surface => TileStyle::white_tint(1.0),
            VisibilityMode::Underground => TileStyle::white_tint(0.1),
        }
    }
}

/// Style a tileset for `mode`. Used when a tileset attaches after a toggle.
pub fn apply_tileset_style(tileset: &mut TilesetPrimitive, mode: VisibilityMode) {
    tileset.style = Some(mode.tile_style());
}

/// Push the presentation parameters of `mode` onto an existing scene.
///
/// Only touches what is already in the scene; nothing is loaded.
pub fn apply_visibility(scene: &mut Scene, mode: VisibilityMode) {
    let globe = scene.globe_mut();
    globe.depth_test_against_terrain = true;
    globe.translucency.enabled = true;
    globe.translucency.front_face_alpha_by_distance = Some(mode.globe_alpha_by_distance());
    scene.camera_controller_mut().enable_collision_detection = true;

    let mut styled = 0usize;
    for tileset in scene.primitives_mut().tilesets_mut() {
        apply_tileset_style(tileset, mode);
        styled += 1;
    }
    debug!(?mode, tilesets = styled, "visibility applied");
}

#[cfg(test)]
mod tests {
    use super::{VisibilityMode, apply_visibility};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::Scene;
    use scene::components::{BoundingVolume, NearFarScalar, TileStyle, TilesetPrimitive};
    use scene::primitives::{Graticule, Primitive};

    fn tileset(id: u64) -> Primitive {
        Primitive::Tileset(Box::new(TilesetPrimitive::new(
            id,
            format!("https://tiles.example/{id}/root.json"),
            BoundingVolume::Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            },
            1,
        )))
    }

    fn scene_with_tilesets() -> Scene {
        let mut scene = Scene::new();
        scene.add_primitive(tileset(1)).expect("add");
        scene
            .add_primitive(Primitive::Graticule(Graticule::default()))
            .expect("add");
        scene.add_primitive(tileset(2)).expect("add");
        scene
    }

    fn styles(scene: &Scene) -> Vec<Option<TileStyle>> {
        scene.primitives().tilesets().map(|t| t.style.clone()).collect()
    }

    #[test]
    fn toggled_is_an_involution() {
        assert_eq!(VisibilityMode::default(), VisibilityMode::Surface);
        assert_eq!(VisibilityMode::Surface.toggled(), VisibilityMode::Underground);
        assert_eq!(VisibilityMode::Surface.toggled().toggled(), VisibilityMode::Surface);
    }

    #[test]
    fn underground_makes_surface_see_through() {
        let mut scene = scene_with_tilesets();
        apply_visibility(&mut scene, VisibilityMode::Underground);

        let translucency = scene.globe().translucency;
        assert!(translucency.enabled);
        assert_eq!(
            translucency.front_face_alpha_by_distance,
            Some(NearFarScalar::new(100.0, 0.2, 100_000.0, 1.0))
        );
        assert_eq!(
            styles(&scene),
            vec![Some(TileStyle::white_tint(0.1)), Some(TileStyle::white_tint(0.1))]
        );
        assert!(scene.globe().front_face_alpha(1500.0) < 0.3);
    }

    #[test]
    fn surface_is_opaque() {
        let mut scene = scene_with_tilesets();
        apply_visibility(&mut scene, VisibilityMode::Surface);
        assert_eq!(
            scene.globe().translucency.front_face_alpha_by_distance,
            Some(NearFarScalar::new(100.0, 1.0, 100_000.0, 1.0))
        );
        assert_eq!(scene.globe().front_face_alpha(150.0), 1.0);
        let expressions: Vec<String> = scene
            .primitives()
            .tilesets()
            .filter_map(|t| t.style.as_ref().map(|s| s.color.to_string()))
            .collect();
        assert_eq!(expressions, vec!["color('white', 1.0)", "color('white', 1.0)"]);
    }

    #[test]
    fn two_transitions_restore_initial_parameters() {
        let mut scene = scene_with_tilesets();
        apply_visibility(&mut scene, VisibilityMode::Surface);
        let globe = *scene.globe();
        let initial = styles(&scene);

        let mut mode = VisibilityMode::Surface;
        for _ in 0..2 {
            mode = mode.toggled();
            apply_visibility(&mut scene, mode);
        }
        assert_eq!(*scene.globe(), globe);
        assert_eq!(styles(&scene), initial);
    }

    #[test]
    fn empty_scene_only_updates_the_globe() {
        let mut scene = Scene::new();
        apply_visibility(&mut scene, VisibilityMode::Underground);
        assert!(scene.primitives().is_empty());
        assert!(scene.globe().translucency.enabled);
    }
}
