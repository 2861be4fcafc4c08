use gpu::Renderer;
use gpu::geometry::{FrameGeometry, MeshCache};
use layers::VisibilityMode;
use scene::Scene;
use tracing::{debug, info};
use wasm_bindgen::prelude::JsValue;

use crate::config::ViewerConfig;
use crate::initializer::prepare;
use crate::toggle::VisibilityToggle;
use crate::wgpu::{WgpuContext, render_scene, resize_wgpu};

/// Wheel units to a relative zoom step.
const ZOOM_RATE: f64 = 0.0015;
/// Drag pixels to radians.
const LOOK_RATE: f64 = 0.003;

/// One mounted viewer: scene, X-Ray state and (once ready) the GPU surface.
#[derive(Debug)]
pub struct Viewer {
    scene: Scene,
    toggle: VisibilityToggle,
    surface: Option<WgpuContext>,
    meshes: MeshCache,
    canvas_size: (u32, u32),
    show_tile_bounds: bool,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        let mut scene = Scene::new();
        let toggle = VisibilityToggle::default();
        prepare(&mut scene, &config.home, &toggle);
        Self {
            scene,
            toggle,
            surface: None,
            meshes: MeshCache::new(),
            canvas_size: (1, 1),
            show_tile_bounds: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn mode(&self) -> VisibilityMode {
        self.toggle.mode()
    }

    pub fn press_toggle(&mut self) -> VisibilityMode {
        self.toggle.press(&mut self.scene)
    }

    pub fn is_destroyed(&self) -> bool {
        self.scene.is_destroyed()
    }

    /// Release the surface and the scene. Returns `false` if already released.
    pub fn destroy(&mut self) -> bool {
        if self.scene.is_destroyed() {
            debug!("viewer already released");
            return false;
        }
        self.surface = None;
        self.meshes = MeshCache::new();
        self.scene.destroy();
        info!("viewer released");
        true
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn set_surface(&mut self, mut ctx: WgpuContext) {
        let (w, h) = self.canvas_size;
        resize_wgpu(&mut ctx, w, h);
        self.surface = Some(ctx);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas_size = (width.max(1), height.max(1));
        if let Some(ctx) = self.surface.as_mut() {
            resize_wgpu(ctx, self.canvas_size.0, self.canvas_size.1);
        }
    }

    pub fn aspect(&self) -> f64 {
        self.canvas_size.0 as f64 / self.canvas_size.1 as f64
    }

    pub fn tile_bounds_enabled(&self) -> bool {
        self.show_tile_bounds
    }

    pub fn set_tile_bounds(&mut self, enabled: bool) {
        self.show_tile_bounds = enabled;
        for primitive in self.scene.primitives_mut().tilesets_mut() {
            primitive.debug_show_bounding_volume = enabled;
        }
    }

    pub fn set_graticule(&mut self, enabled: bool) -> bool {
        match self.scene.primitives_mut().graticule_mut() {
            Some(graticule) => {
                graticule.show = enabled;
                true
            }
            None => false,
        }
    }

    /// Zoom along the view direction; positive deltas back away.
    pub fn zoom(&mut self, wheel_delta: f64) {
        let camera = self.scene.camera_mut();
        let distance = camera.height().max(1.0) * (1.0 - (wheel_delta * ZOOM_RATE).exp());
        camera.move_forward(distance);
    }

    pub fn look(&mut self, dx_px: f64, dy_px: f64) {
        self.scene
            .camera_mut()
            .look(dx_px * LOOK_RATE, -dy_px * LOOK_RATE);
    }

    /// Draw one frame; a no-op until the surface is ready or after release.
    pub fn render(&mut self) -> Result<(), JsValue> {
        if self.scene.is_destroyed() {
            return Ok(());
        }
        let Some(ctx) = self.surface.as_ref() else {
            return Ok(());
        };
        let frame = Renderer::collect(&self.scene, self.aspect());
        let geometry = FrameGeometry::build(&self.scene, &frame, &mut self.meshes);
        render_scene(ctx, &frame, &geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::Viewer;
    use crate::config::ViewerConfig;
    use scene::camera::MIN_CAMERA_HEIGHT_M;

    #[test]
    fn release_happens_once() {
        let mut viewer = Viewer::new(&ViewerConfig::default());
        assert!(!viewer.is_destroyed());
        assert!(viewer.destroy());
        assert!(viewer.is_destroyed());
        assert!(!viewer.destroy());
        assert!(viewer.render().is_ok());
    }

    #[test]
    fn render_waits_for_surface() {
        let mut viewer = Viewer::new(&ViewerConfig::default());
        assert!(!viewer.has_surface());
        assert!(viewer.render().is_ok());
    }

    #[test]
    fn zoom_moves_along_view_and_stays_above_ground() {
        let mut viewer = Viewer::new(&ViewerConfig::default());
        let start = viewer.scene().camera().height();
        viewer.zoom(-200.0);
        let closer = viewer.scene().camera().height();
        assert!(closer < start, "{closer} !< {start}");

        viewer.zoom(200.0);
        assert!(viewer.scene().camera().height() > closer);

        for _ in 0..200 {
            viewer.zoom(-2000.0);
        }
        assert!(viewer.scene().camera().height() >= MIN_CAMERA_HEIGHT_M - 1e-6);
    }

    #[test]
    fn look_turns_heading_and_pitch() {
        let mut viewer = Viewer::new(&ViewerConfig::default());
        let before = viewer.scene().camera().pose().orientation;
        viewer.look(100.0, -50.0);
        let after = viewer.scene().camera().pose().orientation;
        assert!((after.heading - before.heading - 0.3).abs() < 1e-9);
        assert!((after.pitch - before.pitch - 0.15).abs() < 1e-9);
    }

    #[test]
    fn graticule_and_bounds_flags() {
        let mut viewer = Viewer::new(&ViewerConfig::default());
        assert!(viewer.set_graticule(true));
        assert!(
            viewer
                .scene_mut()
                .primitives_mut()
                .graticule_mut()
                .is_some_and(|g| g.show)
        );

        viewer.set_tile_bounds(true);
        assert!(viewer.tile_bounds_enabled());

        viewer.resize(1600, 800);
        assert_eq!(viewer.aspect(), 2.0);
    }
}
