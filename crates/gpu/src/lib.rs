pub mod camera;
pub mod geometry;
pub mod globe;
pub mod mesh;
pub mod renderer;
pub mod vertex;

pub use camera::*;
pub use renderer::*;
pub use vertex::*;
