use scene::{Scene, SceneError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Something that contributes content to a [`Scene`].
pub trait Layer {
    fn id(&self) -> LayerId;

    /// Adds this layer's content; returns how many items were added.
    fn populate(&self, scene: &mut Scene) -> Result<usize, SceneError>;
}
