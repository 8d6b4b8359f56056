//! Driver capability record.
//!
//! A driver is described by a fixed set of optional operations plus its
//! declared attributes. Every operation is fire-and-forget: the driver starts
//! the work and later reports completion through a
//! [`CallbackSender`](crate::callback::CallbackSender).
//!
//! # Examples
//!
//! ```
//! use fprint_hardware::driver::ImageDriver;
//! use fprint_hardware::types::DriverInfo;
//!
//! let driver = ImageDriver::builder(DriverInfo::new("demo", "Demo Sensor"))
//!     .on_activate(|_state| Ok(()))
//!     .on_deactivate(|| {})
//!     .build()
//!     .unwrap();
//!
//! assert!(driver.supports_activate());
//! assert!(!driver.supports_open());
//! ```

use std::fmt;

use fprint_core::DeviceState;

use crate::config::DriverConfig;
use crate::error::Result;
use crate::types::DriverInfo;

/// Open the device; receives opaque driver data from device discovery.
pub type OpenFn = Box<dyn FnMut(u64) -> Result<()> + Send>;

/// Close the device.
pub type CloseFn = Box<dyn FnMut() + Send>;

/// Power up the sensor and enter the given mode.
pub type ActivateFn = Box<dyn FnMut(DeviceState) -> Result<()> + Send>;

/// Power down the sensor.
pub type DeactivateFn = Box<dyn FnMut() + Send>;

/// Switch the sensor to another mode.
pub type ChangeStateFn = Box<dyn FnMut(DeviceState) -> Result<()> + Send>;

/// Capability record of an imaging driver.
///
/// Absent operations are legal; the [`DriverAdapter`](crate::adapter::DriverAdapter)
/// treats them as instantaneous successes.
pub struct ImageDriver {
    pub(crate) info: DriverInfo,
    pub(crate) config: DriverConfig,
    pub(crate) open: Option<OpenFn>,
    pub(crate) close: Option<CloseFn>,
    pub(crate) activate: Option<ActivateFn>,
    pub(crate) deactivate: Option<DeactivateFn>,
    pub(crate) change_state: Option<ChangeStateFn>,
}

impl fmt::Debug for ImageDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDriver")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .field("activate", &self.activate.is_some())
            .field("deactivate", &self.deactivate.is_some())
            .field("change_state", &self.change_state.is_some())
            .finish()
    }
}

impl ImageDriver {
    /// Create a builder for a driver with the given identification.
    pub fn builder(info: DriverInfo) -> ImageDriverBuilder {
        ImageDriverBuilder::new(info)
    }

    pub fn info(&self) -> &DriverInfo {
        &self.info
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn supports_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn supports_close(&self) -> bool {
        self.close.is_some()
    }

    pub fn supports_activate(&self) -> bool {
        self.activate.is_some()
    }

    pub fn supports_deactivate(&self) -> bool {
        self.deactivate.is_some()
    }

    pub fn supports_change_state(&self) -> bool {
        self.change_state.is_some()
    }
}

/// Builder for [`ImageDriver`].
pub struct ImageDriverBuilder {
    driver: ImageDriver,
}

impl ImageDriverBuilder {
    pub fn new(info: DriverInfo) -> Self {
        Self {
            driver: ImageDriver {
                info,
                config: DriverConfig::default(),
                open: None,
                close: None,
                activate: None,
                deactivate: None,
                change_state: None,
            },
        }
    }

    /// Set the declared configuration.
    pub fn config(mut self, config: DriverConfig) -> Self {
        self.driver.config = config;
        self
    }

    pub fn on_open(mut self, f: impl FnMut(u64) -> Result<()> + Send + 'static) -> Self {
        self.driver.open = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.driver.close = Some(Box::new(f));
        self
    }

    pub fn on_activate(
        mut self,
        f: impl FnMut(DeviceState) -> Result<()> + Send + 'static,
    ) -> Self {
        self.driver.activate = Some(Box::new(f));
        self
    }

    pub fn on_deactivate(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.driver.deactivate = Some(Box::new(f));
        self
    }

    pub fn on_change_state(
        mut self,
        f: impl FnMut(DeviceState) -> Result<()> + Send + 'static,
    ) -> Self {
        self.driver.change_state = Some(Box::new(f));
        self
    }

    /// Build the driver after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared configuration is invalid.
    pub fn build(self) -> Result<ImageDriver> {
        self.driver.config.validate()?;
        Ok(self.driver)
    }
}
