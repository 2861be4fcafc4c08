pub mod camera;
pub mod components;
pub mod entity;
pub mod primitives;
pub mod world;

pub use world::*;
