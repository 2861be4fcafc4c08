use tracing::debug;

use crate::camera::Camera;
use crate::components::{CorridorGeometry, GlobeSettings};
use crate::entity::{EntityCollection, EntityId};
use crate::primitives::{Primitive, PrimitiveCollection, PrimitiveId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("scene has already been destroyed")]
    Destroyed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CameraController {
    /// Keep the camera above the globe surface while navigating.
    pub enable_collision_detection: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            enable_collision_detection: true,
        }
    }
}

/// Everything that gets drawn: camera, globe, entities, primitives.
///
/// Once [`destroy`](Scene::destroy)ed the scene is empty and rejects new
/// content, so late async results cannot resurrect it.
#[derive(Debug, Default)]
pub struct Scene {
    camera: Camera,
    globe: GlobeSettings,
    camera_controller: CameraController,
    entities: EntityCollection,
    primitives: PrimitiveCollection,
    destroyed: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn globe(&self) -> &GlobeSettings {
        &self.globe
    }

    pub fn globe_mut(&mut self) -> &mut GlobeSettings {
        &mut self.globe
    }

    pub fn camera_controller(&self) -> &CameraController {
        &self.camera_controller
    }

    pub fn camera_controller_mut(&mut self) -> &mut CameraController {
        &mut self.camera_controller
    }

    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    pub fn primitives(&self) -> &PrimitiveCollection {
        &self.primitives
    }

    pub fn primitives_mut(&mut self) -> &mut PrimitiveCollection {
        &mut self.primitives
    }

    pub fn add_corridor(
        &mut self,
        name: impl Into<String>,
        corridor: CorridorGeometry,
    ) -> Result<EntityId, SceneError> {
        self.ensure_live()?;
        Ok(self.entities.add(name.into(), corridor))
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> Result<PrimitiveId, SceneError> {
        self.ensure_live()?;
        Ok(self.primitives.add(primitive))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Release all scene content. Returns `false` if it was already released.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        debug!(
            entities = self.entities.len(),
            primitives = self.primitives.len(),
            "destroying scene"
        );
        self.entities.clear();
        self.primitives.clear();
        self.destroyed = true;
        true
    }

    fn ensure_live(&self) -> Result<(), SceneError> {
        if self.destroyed {
            Err(SceneError::Destroyed)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scene, SceneError};
    use crate::components::{BoundingVolume, Color, CorridorGeometry, TilesetPrimitive};
    use crate::primitives::{Graticule, Primitive};
    use foundation::math::Vec3;

    fn corridor() -> CorridorGeometry {
        CorridorGeometry {
            positions: vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            width: 15.0,
            height: 30.0,
            extruded_height: 20.0,
            material: Color::RED,
            outline: true,
            outline_color: Color::WHITE,
        }
    }

    fn tileset(asset_id: u64) -> Primitive {
        Primitive::Tileset(Box::new(TilesetPrimitive::new(
            asset_id,
            "https://tiles.example/root.json".to_string(),
            BoundingVolume::Sphere {
                center: Vec3::ZERO,
                radius: 1.0,
            },
            1,
        )))
    }

    #[test]
    fn entities_get_sequential_ids() {
        let mut scene = Scene::new();
        let a = scene.add_corridor("Line 1", corridor()).expect("add");
        let b = scene.add_corridor("Line 2", corridor()).expect("add");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(scene.entities().get(b).map(|e| e.name.as_str()), Some("Line 2"));
    }

    #[test]
    fn tilesets_filter_skips_other_primitives() {
        let mut scene = Scene::new();
        scene.add_primitive(tileset(1)).expect("add");
        scene
            .add_primitive(Primitive::Graticule(Graticule::default()))
            .expect("add");
        scene.add_primitive(tileset(2)).expect("add");

        let ids: Vec<u64> = scene.primitives().tilesets().map(|t| t.asset_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(scene.primitives().len(), 3);
    }

    #[test]
    fn destroy_is_idempotent_and_blocks_additions() {
        let mut scene = Scene::new();
        scene.add_corridor("Line 1", corridor()).expect("add");
        scene.add_primitive(tileset(1)).expect("add");

        assert!(scene.destroy());
        assert!(scene.is_destroyed());
        assert!(scene.entities().is_empty());
        assert!(scene.primitives().is_empty());
        assert!(!scene.destroy());

        assert_eq!(
            scene.add_corridor("late", corridor()),
            Err(SceneError::Destroyed)
        );
        assert_eq!(scene.add_primitive(tileset(3)), Err(SceneError::Destroyed));
    }
}
