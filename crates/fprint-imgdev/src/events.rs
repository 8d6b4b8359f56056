//! Notifications delivered to the front-end.
//!
//! Every completion and result of an imaging device is reported as a
//! [`DeviceEvent`] to the device's [`DeviceListener`]. The listener gets the
//! device back mutably and may start or stop operations from inside the
//! notification; events raised meanwhile are queued and delivered in order
//! once the listener returns.

use fprint_biometric::PrintData;
use fprint_core::{Action, CaptureResult, DriverFault, EnrollResult, ScanError, VerifyResult};
use fprint_hardware::Image;
use tokio::sync::mpsc;

use crate::device::ImgDevice;

/// Notification from an imaging device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Device open finished.
    OpenComplete(Result<(), DriverFault>),

    /// Device close finished.
    CloseComplete,

    /// Sensor activation for `action` finished.
    Started {
        action: Action,
        status: Result<(), DriverFault>,
    },

    /// `action` was stopped and the device is idle again.
    Stopped { action: Action },

    /// An enrollment stage finished. `print` carries the template on completion.
    EnrollStageCompleted {
        result: Result<EnrollResult, ScanError>,
        print: Option<PrintData>,
        image: Option<Image>,
    },

    /// A verification scan finished.
    VerifyResult {
        result: Result<VerifyResult, ScanError>,
        image: Option<Image>,
    },

    /// An identification scan finished. `match_offset` is the gallery index
    /// of the matching print.
    IdentifyResult {
        result: Result<VerifyResult, ScanError>,
        match_offset: Option<usize>,
        image: Option<Image>,
    },

    /// A capture finished.
    CaptureResult {
        result: Result<CaptureResult, ScanError>,
        image: Option<Image>,
    },
}

impl DeviceEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            DeviceEvent::OpenComplete(_) => "open-complete",
            DeviceEvent::CloseComplete => "close-complete",
            DeviceEvent::Started { .. } => "started",
            DeviceEvent::Stopped { .. } => "stopped",
            DeviceEvent::EnrollStageCompleted { .. } => "enroll-stage-completed",
            DeviceEvent::VerifyResult { .. } => "verify-result",
            DeviceEvent::IdentifyResult { .. } => "identify-result",
            DeviceEvent::CaptureResult { .. } => "capture-result",
        }
    }
}

/// Receiver of device notifications.
///
/// Implemented for any `FnMut(&mut ImgDevice, DeviceEvent)` closure.
pub trait DeviceListener: Send {
    fn on_event(&mut self, device: &mut ImgDevice, event: DeviceEvent);
}

impl<F> DeviceListener for F
where
    F: FnMut(&mut ImgDevice, DeviceEvent) + Send,
{
    fn on_event(&mut self, device: &mut ImgDevice, event: DeviceEvent) {
        self(device, event)
    }
}

/// Listener forwarding every event to a channel.
///
/// Useful when the front-end consumes results from an async task instead of
/// reacting inside the notification.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<DeviceEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DeviceListener for ChannelListener {
    fn on_event(&mut self, _device: &mut ImgDevice, event: DeviceEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}
