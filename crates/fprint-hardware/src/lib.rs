//! Driver-facing layer for imaging fingerprint devices.
//!
//! This crate defines what a sensor driver provides to the session core and
//! how it talks back:
//!
//! - [`ImageDriver`]: a capability record of optional operations (`open`,
//!   `close`, `activate`, `deactivate`, `change_state`) plus declared
//!   attributes ([`DriverConfig`]).
//! - [`DriverAdapter`]: the single place where absent capabilities are turned
//!   into no-op successes.
//! - [`CallbackSender`]: the channel through which a driver reports
//!   completions, finger status, captured images and faults.
//! - [`Image`]: the raw raster a driver hands over after a scan.
//!
//! # Fire-and-forget
//!
//! Every capability call returns as soon as the driver has started the work.
//! The outcome arrives later as a [`DriverCallback`]:
//!
//! ```
//! use fprint_core::DeviceState;
//! use fprint_hardware::{DriverAdapter, DriverCallback, ImageDriver, callback_channel};
//! use fprint_hardware::types::DriverInfo;
//!
//! let (callbacks, mut receiver) = callback_channel();
//! let driver = ImageDriver::builder(DriverInfo::new("demo", "Demo Sensor"))
//!     .on_activate(move |_state| callbacks.activate_complete(Ok(())))
//!     .build()
//!     .unwrap();
//!
//! let mut adapter = DriverAdapter::new(driver);
//! adapter.activate(DeviceState::AwaitFingerOn).unwrap();
//!
//! assert_eq!(receiver.try_recv().unwrap(), DriverCallback::ActivateComplete(Ok(())));
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides a scripted sensor for development and tests.

pub mod adapter;
pub mod callback;
pub mod config;
pub mod driver;
pub mod error;
pub mod mock;
pub mod types;

// Re-export commonly used types for convenience
pub use adapter::{Completion, DriverAdapter};
pub use callback::{CallbackReceiver, CallbackSender, DriverCallback, callback_channel};
pub use config::DriverConfig;
pub use driver::{ImageDriver, ImageDriverBuilder};
pub use error::{HardwareError, Result};
pub use types::{DriverInfo, Image, ImageFlags};
