//! Driver capability adapter.
//!
//! The adapter is the only place that looks at which capabilities a driver
//! provides. Absent `open`/`close` complete immediately with success; absent
//! `activate`/`change_state` succeed without side effect and an absent
//! `deactivate` does nothing. Failures from the driver are returned verbatim;
//! retry policy belongs to the session.

use fprint_core::DeviceState;
use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::driver::ImageDriver;
use crate::error::Result;
use crate::types::DriverInfo;

/// How a request that has a completion callback finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The driver accepted the request and will report completion later.
    Pending,
    /// The driver does not implement the operation; it completed successfully now.
    Immediate,
}

/// Dispatches session requests to a driver's capability record.
#[derive(Debug)]
pub struct DriverAdapter {
    driver: ImageDriver,
}

impl DriverAdapter {
    pub fn new(driver: ImageDriver) -> Self {
        Self { driver }
    }

    pub fn info(&self) -> &DriverInfo {
        &self.driver.info
    }

    pub fn config(&self) -> &DriverConfig {
        &self.driver.config
    }

    /// Open the device.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if it refuses to open.
    pub fn open(&mut self, driver_data: u64) -> Result<Completion> {
        match self.driver.open.as_mut() {
            Some(open) => {
                debug!(driver = %self.driver.info.name, driver_data, "opening device");
                open(driver_data)?;
                Ok(Completion::Pending)
            }
            None => Ok(Completion::Immediate),
        }
    }

    /// Close the device.
    pub fn close(&mut self) -> Completion {
        match self.driver.close.as_mut() {
            Some(close) => {
                debug!(driver = %self.driver.info.name, "closing device");
                close();
                Completion::Pending
            }
            None => Completion::Immediate,
        }
    }

    /// Activate the sensor in the given mode.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if activation cannot be started.
    pub fn activate(&mut self, state: DeviceState) -> Result<()> {
        let Some(activate) = self.driver.activate.as_mut() else {
            return Ok(());
        };
        debug!(driver = %self.driver.info.name, %state, "activating sensor");
        activate(state).inspect_err(|e| warn!("activation failed: {}", e))
    }

    /// Deactivate the sensor.
    pub fn deactivate(&mut self) {
        if let Some(deactivate) = self.driver.deactivate.as_mut() {
            debug!(driver = %self.driver.info.name, "deactivating sensor");
            deactivate();
        }
    }

    /// Switch the sensor to another mode.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the mode change is refused.
    pub fn change_state(&mut self, state: DeviceState) -> Result<()> {
        let Some(change_state) = self.driver.change_state.as_mut() else {
            return Ok(());
        };
        debug!(driver = %self.driver.info.name, %state, "changing sensor state");
        change_state(state)
    }
}
