pub mod segments;
pub mod tileset;
pub mod transit;

pub use segments::*;
pub use tileset::*;
pub use transit::*;
