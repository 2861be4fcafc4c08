pub mod layer;
pub mod symbology;
pub mod transit;
pub mod xray;

pub use layer::*;
pub use symbology::*;
pub use transit::*;
pub use xray::*;
