//! Driver-to-core callback channel.
//!
//! Drivers report completions and sensor events through a [`CallbackSender`].
//! All callbacks of one device travel through a single channel, so the core
//! consumes them strictly one at a time and never sees two callbacks in
//! flight for the same session.
//!
//! ```text
//! ┌──────────┐  CallbackSender   ┌─────────────┐
//! │ Driver   │──────────────────►│  mpsc       │──────► DeviceRunner ──► session
//! │ backend  │                   │  (unbounded)│
//! └──────────┘                   └─────────────┘
//! ```

use fprint_core::{ActionResult, DriverFault};
use tokio::sync::mpsc;

use crate::error::{HardwareError, Result};
use crate::types::Image;

/// Asynchronous report from a driver to the session core.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCallback {
    /// Device open finished.
    OpenComplete(std::result::Result<(), DriverFault>),

    /// Device close finished.
    CloseComplete,

    /// Sensor activation finished.
    ActivateComplete(std::result::Result<(), DriverFault>),

    /// Sensor deactivation finished.
    DeactivateComplete,

    /// Finger placed on (`true`) or removed from (`false`) the sensor.
    FingerStatus(bool),

    /// A raw image was captured.
    ImageCaptured(Image),

    /// The driver hit a hardware or protocol fault.
    SessionError(DriverFault),

    /// The driver abandons the current scan with the given result.
    AbortScan(ActionResult),
}

/// Receiving half of a callback channel.
pub type CallbackReceiver = mpsc::UnboundedReceiver<DriverCallback>;

/// Create a callback channel for one device.
pub fn callback_channel() -> (CallbackSender, CallbackReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CallbackSender { tx }, rx)
}

/// Sending half of a callback channel, held by the driver backend.
///
/// Sending never blocks, so callbacks can be raised from inside capability
/// calls.
#[derive(Debug, Clone)]
pub struct CallbackSender {
    tx: mpsc::UnboundedSender<DriverCallback>,
}

impl CallbackSender {
    /// Send a raw callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiving device has been dropped.
    pub fn send(&self, callback: DriverCallback) -> Result<()> {
        self.tx
            .send(callback)
            .map_err(|_| HardwareError::disconnected("Driver callback channel closed"))
    }

    pub fn open_complete(&self, status: std::result::Result<(), DriverFault>) -> Result<()> {
        self.send(DriverCallback::OpenComplete(status))
    }

    pub fn close_complete(&self) -> Result<()> {
        self.send(DriverCallback::CloseComplete)
    }

    pub fn activate_complete(&self, status: std::result::Result<(), DriverFault>) -> Result<()> {
        self.send(DriverCallback::ActivateComplete(status))
    }

    pub fn deactivate_complete(&self) -> Result<()> {
        self.send(DriverCallback::DeactivateComplete)
    }

    pub fn finger_status(&self, present: bool) -> Result<()> {
        self.send(DriverCallback::FingerStatus(present))
    }

    pub fn image_captured(&self, image: Image) -> Result<()> {
        self.send(DriverCallback::ImageCaptured(image))
    }

    pub fn session_error(&self, fault: DriverFault) -> Result<()> {
        self.send(DriverCallback::SessionError(fault))
    }

    pub fn abort_scan(&self, result: ActionResult) -> Result<()> {
        self.send(DriverCallback::AbortScan(result))
    }

    /// Whether the receiving device has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
