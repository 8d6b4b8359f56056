//! Callback pump for an imaging device.
//!
//! Drivers report through a [`CallbackReceiver`]; the runner feeds those
//! reports into the [`ImgDevice`] one at a time, either synchronously with
//! [`DeviceRunner::pump`] or as an async task with [`DeviceRunner::run`].

use fprint_core::Result;
use fprint_hardware::CallbackReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error};

use crate::device::ImgDevice;

/// Owns a device and the receiving end of its driver callbacks.
#[derive(Debug)]
pub struct DeviceRunner {
    device: ImgDevice,
    callbacks: CallbackReceiver,
}

impl DeviceRunner {
    pub fn new(device: ImgDevice, callbacks: CallbackReceiver) -> Self {
        Self { device, callbacks }
    }

    pub fn device(&self) -> &ImgDevice {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut ImgDevice {
        &mut self.device
    }

    /// Apply every callback that is already queued, including those raised
    /// while applying earlier ones.
    ///
    /// Returns the number of callbacks applied.
    ///
    /// # Errors
    ///
    /// Returns the first internal inconsistency reported by the device.
    pub fn pump(&mut self) -> Result<usize> {
        let mut applied = 0;
        loop {
            match self.callbacks.try_recv() {
                Ok(callback) => {
                    self.apply(callback)?;
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(applied),
            }
        }
    }

    /// Wait for the next callback and apply it.
    ///
    /// Returns `Ok(false)` once every sender is gone.
    ///
    /// # Errors
    ///
    /// Returns an internal inconsistency reported by the device.
    pub async fn step(&mut self) -> Result<bool> {
        match self.callbacks.recv().await {
            Some(callback) => {
                self.apply(callback)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply callbacks until the device is closed or the driver goes away.
    ///
    /// # Errors
    ///
    /// Returns the first internal inconsistency reported by the device.
    pub async fn run(mut self) -> Result<ImgDevice> {
        while !self.device.is_closed() {
            if !self.step().await? {
                debug!("driver callback channel closed");
                break;
            }
        }
        Ok(self.device)
    }

    pub fn into_inner(self) -> ImgDevice {
        self.device
    }

    fn apply(&mut self, callback: fprint_hardware::DriverCallback) -> Result<()> {
        self.device
            .handle_callback(callback)
            .inspect_err(|e| error!("device callback failed: {}", e))
    }
}
