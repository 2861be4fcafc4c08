pub mod error;
pub mod fetch;
pub mod protocol;
pub mod service;

pub use error::*;
pub use fetch::*;
pub use protocol::*;
pub use service::*;
