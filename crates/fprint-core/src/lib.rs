pub mod constants;
pub mod error;
pub mod types;

pub use error::{DriverFault, Error, Result, ScanError};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
