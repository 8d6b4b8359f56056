//! Mock imaging sensor for testing and development.
//!
//! The mock implements every driver capability. Each call is recorded, and
//! completions (open, close, activate, deactivate) are reported back through
//! the callback channel right away, the way a fast USB sensor would. Finger
//! and image events are injected through the [`MockSensorHandle`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fprint_core::{ActionResult, DeviceState, DriverFault};

use crate::{
    HardwareError, Result,
    callback::CallbackSender,
    config::DriverConfig,
    driver::ImageDriver,
    types::{DriverInfo, Image},
};

/// Capability call made on the mock sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Open(u64),
    Close,
    Activate(DeviceState),
    Deactivate,
    ChangeState(DeviceState),
}

/// Scripted behavior for the next capability calls.
#[derive(Debug, Default)]
struct MockBehavior {
    /// Report this fault when activation completes.
    activation_fault: Option<DriverFault>,

    /// Refuse activation synchronously.
    refuse_activation: bool,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<DriverCall>,
    behavior: MockBehavior,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Factory for mock imaging sensors.
///
/// # Examples
///
/// ```
/// use fprint_hardware::callback::callback_channel;
/// use fprint_hardware::mock::{DriverCall, MockSensor};
///
/// let (callbacks, _receiver) = callback_channel();
/// let (driver, handle) = MockSensor::new(callbacks);
///
/// assert!(driver.supports_activate());
/// assert!(handle.calls().is_empty());
/// ```
#[derive(Debug)]
pub struct MockSensor;

impl MockSensor {
    /// Create a mock sensor with default configuration.
    pub fn new(callbacks: CallbackSender) -> (ImageDriver, MockSensorHandle) {
        Self::with_config(DriverConfig::default(), callbacks)
    }

    /// Create a mock sensor with the given declared configuration.
    ///
    /// The configuration is expected to be valid; an invalid one is
    /// replaced by the default.
    pub fn with_config(
        config: DriverConfig,
        callbacks: CallbackSender,
    ) -> (ImageDriver, MockSensorHandle) {
        let config = if config.validate().is_ok() {
            config
        } else {
            DriverConfig::default()
        };

        let state = Arc::new(Mutex::new(MockState::default()));
        let info = DriverInfo::new("mock", "Mock Imaging Sensor");

        let open_state = state.clone();
        let open_cb = callbacks.clone();
        let close_state = state.clone();
        let close_cb = callbacks.clone();
        let activate_state = state.clone();
        let activate_cb = callbacks.clone();
        let deactivate_state = state.clone();
        let deactivate_cb = callbacks.clone();
        let change_state = state.clone();

        let driver = ImageDriver {
            info,
            config,
            open: Some(Box::new(move |data| {
                lock(&open_state).calls.push(DriverCall::Open(data));
                open_cb.open_complete(Ok(()))
            })),
            close: Some(Box::new(move || {
                lock(&close_state).calls.push(DriverCall::Close);
                let _ = close_cb.close_complete();
            })),
            activate: Some(Box::new(move |target| {
                let fault = {
                    let mut state = lock(&activate_state);
                    state.calls.push(DriverCall::Activate(target));
                    if state.behavior.refuse_activation {
                        return Err(HardwareError::activation_failed("sensor refused"));
                    }
                    state.behavior.activation_fault.take()
                };
                activate_cb.activate_complete(fault.map_or(Ok(()), Err))
            })),
            deactivate: Some(Box::new(move || {
                lock(&deactivate_state).calls.push(DriverCall::Deactivate);
                let _ = deactivate_cb.deactivate_complete();
            })),
            change_state: Some(Box::new(move |target| {
                lock(&change_state)
                    .calls
                    .push(DriverCall::ChangeState(target));
                Ok(())
            })),
        };

        let handle = MockSensorHandle { callbacks, state };
        (driver, handle)
    }
}

/// Handle for controlling a mock sensor.
///
/// # Examples
///
/// ```
/// use fprint_hardware::callback::{DriverCallback, callback_channel};
/// use fprint_hardware::mock::MockSensor;
/// use fprint_hardware::types::Image;
///
/// let (callbacks, mut receiver) = callback_channel();
/// let (_driver, handle) = MockSensor::new(callbacks);
///
/// handle.scan(Image::new(2, 2, vec![255; 4])).unwrap();
///
/// assert_eq!(receiver.try_recv().unwrap(), DriverCallback::FingerStatus(true));
/// assert!(matches!(receiver.try_recv().unwrap(), DriverCallback::ImageCaptured(_)));
/// assert_eq!(receiver.try_recv().unwrap(), DriverCallback::FingerStatus(false));
/// ```
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    callbacks: CallbackSender,
    state: Arc<Mutex<MockState>>,
}

impl MockSensorHandle {
    /// Simulate a finger touching the sensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn finger_on(&self) -> Result<()> {
        self.callbacks.finger_status(true)
    }

    /// Simulate the finger being lifted.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn finger_off(&self) -> Result<()> {
        self.callbacks.finger_status(false)
    }

    /// Deliver a captured image.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn capture(&self, image: Image) -> Result<()> {
        self.callbacks.image_captured(image)
    }

    /// Simulate a full touch: finger on, image, finger off.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn scan(&self, image: Image) -> Result<()> {
        self.finger_on()?;
        self.capture(image)?;
        self.finger_off()
    }

    /// Report a hardware fault.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn session_error(&self, fault: DriverFault) -> Result<()> {
        self.callbacks.session_error(fault)
    }

    /// Abandon the current scan with the given result.
    ///
    /// # Errors
    ///
    /// Returns an error if the device side of the channel is gone.
    pub fn abort_scan(&self, result: ActionResult) -> Result<()> {
        self.callbacks.abort_scan(result)
    }

    /// Make the next activation complete with a fault.
    pub fn fail_next_activation(&self, fault: DriverFault) {
        lock(&self.state).behavior.activation_fault = Some(fault);
    }

    /// Make activation requests fail synchronously.
    pub fn refuse_activation(&self, refuse: bool) {
        lock(&self.state).behavior.refuse_activation = refuse;
    }

    /// All capability calls made so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        lock(&self.state).calls.clone()
    }

    /// The last sensor mode requested through `activate` or `change_state`.
    pub fn last_requested_state(&self) -> Option<DeviceState> {
        lock(&self.state)
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                DriverCall::Activate(state) | DriverCall::ChangeState(state) => Some(*state),
                _ => None,
            })
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }
}
