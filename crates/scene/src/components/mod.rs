pub mod bounds;
pub mod color;
pub mod corridor;
pub mod globe;
pub mod style;
pub mod tileset;

pub use bounds::*;
pub use color::*;
pub use corridor::*;
pub use globe::*;
pub use style::*;
pub use tileset::*;
