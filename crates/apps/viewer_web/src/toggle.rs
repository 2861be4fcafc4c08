use layers::{VisibilityMode, apply_visibility};
use scene::Scene;
use tracing::info;

/// Surface / X-Ray state of the viewer. Starts at the surface.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VisibilityToggle {
    mode: VisibilityMode,
}

impl VisibilityToggle {
    pub fn mode(&self) -> VisibilityMode {
        self.mode
    }

    pub fn is_underground(&self) -> bool {
        self.mode.is_underground()
    }

    /// Push the current state onto the scene without changing it.
    pub fn enter(&self, scene: &mut Scene) {
        apply_visibility(scene, self.mode);
    }

    pub fn press(&mut self, scene: &mut Scene) -> VisibilityMode {
        self.mode = self.mode.toggled();
        self.enter(scene);
        info!(mode = ?self.mode, "visibility toggled");
        self.mode
    }
}
