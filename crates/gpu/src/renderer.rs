use foundation::math::{EnuFrame, Vec3, ecef_to_geodetic};
use scene::Scene;
use scene::components::Color;
use scene::entity::EntityId;

use crate::camera::{CameraMatrices, camera_matrices};

/// When the globe is drawn relative to the rest of the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlobePass {
    /// Opaque: drawn first and writes depth.
    BeforeOpaque,
    /// Translucent: blended over everything else, depth-tested only.
    AfterOpaque,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeDraw {
    pub color: [f32; 4],
    pub pass: GlobePass,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorridorDraw {
    pub entity: EntityId,
    pub fill: [f32; 4],
    pub outline: Option<[f32; 4]>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundsDraw {
    pub asset_id: u64,
    pub corners: [Vec3; 8],
    pub color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GraticuleDraw {
    pub step_deg: f64,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub camera: CameraMatrices,
    pub light_dir: [f32; 3],
    pub globe: GlobeDraw,
    pub corridors: Vec<CorridorDraw>,
    pub tileset_bounds: Vec<BoundsDraw>,
    pub graticule: Option<GraticuleDraw>,
}

pub struct Renderer;

impl Renderer {
    pub fn collect(scene: &Scene, aspect: f64) -> RenderFrame {
        let camera = camera_matrices(scene.camera(), aspect);
        let globe_settings = scene.globe();

        let alpha = globe_settings.front_face_alpha(scene.camera().height()).clamp(0.0, 1.0);
        let pass = if alpha < 1.0 {
            GlobePass::AfterOpaque
        } else {
            GlobePass::BeforeOpaque
        };
        let globe = GlobeDraw {
            color: globe_settings.base_color.with_alpha(alpha as f32).to_array(),
            pass,
        };

        let corridors = scene
            .entities()
            .iter()
            .map(|e| CorridorDraw {
                entity: e.id,
                fill: e.corridor.material.to_array(),
                outline: e.corridor.outline.then(|| e.corridor.outline_color.to_array()),
            })
            .collect();

        let tileset_bounds = scene
            .primitives()
            .tilesets()
            .filter(|t| t.show && t.debug_show_bounding_volume)
            .map(|t| BoundsDraw {
                asset_id: t.asset_id,
                corners: t.root_volume.corners(),
                color: t
                    .style
                    .as_ref()
                    .map_or(Color::WHITE, |s| s.color.evaluate())
                    .to_array(),
            })
            .collect();

        let graticule = scene.primitives().iter().find_map(|p| match p {
            scene::primitives::Primitive::Graticule(g) if g.show => Some(GraticuleDraw {
                step_deg: g.step_deg,
                color: g.color.to_array(),
            }),
            _ => None,
        });

        RenderFrame {
            camera,
            light_dir: light_dir(camera.eye),
            globe,
            corridors,
            tileset_bounds,
            graticule,
        }
    }
}

/// Light from high in the south-east of the camera.
fn light_dir(eye: Vec3) -> [f32; 3] {
    let frame = EnuFrame::at(ecef_to_geodetic(eye));
    let d = frame.direction_to_world([0.4, -0.3, 0.85]).normalize();
    [d.x as f32, d.y as f32, d.z as f32]
}
