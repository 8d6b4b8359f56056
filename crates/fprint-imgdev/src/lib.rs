//! Session core for imaging fingerprint devices.
//!
//! Drivers for imaging sensors only know how to activate the sensor, report
//! finger presence and hand over raw images. This crate turns that into
//! enrollment, verification, identification and capture:
//!
//! - [`ImgDevice`]: the acquisition state machine, driven by front-end
//!   requests and driver callbacks.
//! - [`Session`]: per-operation data with a bounded transition history.
//! - [`DeviceEvent`] / [`DeviceListener`]: results and completions delivered
//!   to the front-end.
//! - [`DeviceRunner`]: feeds driver callbacks into the device.
//!
//! # Examples
//!
//! ```
//! use fprint_biometric::{MinutiaeEngine, synthetic};
//! use fprint_core::{AcquireState, Action};
//! use fprint_hardware::callback_channel;
//! use fprint_hardware::mock::MockSensor;
//! use fprint_imgdev::{ChannelListener, DeviceEvent, DeviceRunner, ImgDevice};
//!
//! let (callbacks, receiver) = callback_channel();
//! let (driver, sensor) = MockSensor::new(callbacks);
//! let (listener, mut events) = ChannelListener::new();
//!
//! let device = ImgDevice::open(driver, Box::new(MinutiaeEngine::default()), listener, 0).unwrap();
//! let mut runner = DeviceRunner::new(device, receiver);
//! runner.pump().unwrap();
//!
//! runner.device_mut().capture_start(false).unwrap();
//! runner.pump().unwrap();
//! assert_eq!(runner.device().acquire_state(), AcquireState::AwaitFingerOn);
//!
//! sensor.scan(synthetic::finger(64, 64, 6, 0)).unwrap();
//! runner.pump().unwrap();
//!
//! assert_eq!(events.try_recv().unwrap(), DeviceEvent::OpenComplete(Ok(())));
//! assert!(matches!(events.try_recv().unwrap(), DeviceEvent::Started { action: Action::Capture, .. }));
//! assert!(matches!(events.try_recv().unwrap(), DeviceEvent::CaptureResult { result: Ok(_), .. }));
//! ```

pub mod acquire;
pub mod device;
pub mod events;
pub mod intake;
pub mod policy;
pub mod runner;
pub mod session;

pub use acquire::AcquisitionBuffer;
pub use device::{DeviceStatus, ImgDevice};
pub use events::{ChannelListener, DeviceEvent, DeviceListener};
pub use runner::DeviceRunner;
pub use session::{Session, StateTransition};
