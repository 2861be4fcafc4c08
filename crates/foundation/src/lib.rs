pub mod handles;
pub mod math;

pub use handles::*;
