//! Imaging device session state machine.
//!
//! [`ImgDevice`] sits between a front-end and an imaging driver. Front-end
//! requests (`*_start`, `*_stop`, `open`, `close`) are translated into
//! driver capability calls. Driver callbacks (`activate_complete`,
//! `report_finger_status`, `image_captured`, ...) advance the session and
//! eventually deliver results as [`DeviceEvent`]s.
//!
//! # Scan cycle
//!
//! ```text
//! start ─► Activating ─► AwaitFingerOn ─► AwaitImage ─► AwaitFingerOff ─┐
//!                              ▲                                        │
//!                              └──────── retry / next stage ◄───────────┘
//! stop ─► Deactivating ─► Idle
//! ```
//!
//! A result is computed when the image arrives but is only delivered after
//! the finger is lifted. Terminal results leave the session in
//! `AwaitFingerOff` until the front-end stops the action.

use std::collections::VecDeque;

use fprint_biometric::{MatchEngine, PrintData};
use fprint_core::{
    AcquireState, Action, ActionResult, CaptureResult, DeviceState, DriverFault, EnrollResult,
    Error, Result, RetryReason, VerifyResult,
};
use fprint_hardware::{Completion, DriverAdapter, DriverCallback, DriverInfo, Image, ImageDriver};
use tracing::{debug, error, info, warn};

use crate::events::{DeviceEvent, DeviceListener};
use crate::intake;
use crate::policy;
use crate::session::{Session, StateTransition};

/// Lifecycle of the device itself, independent of any action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Opening,
    Open,
    Closing,
    Closed,
}

/// Session core of one imaging device.
pub struct ImgDevice {
    driver: DriverAdapter,
    engine: Box<dyn MatchEngine>,
    session: Session,
    status: DeviceStatus,
    verify_data: Option<PrintData>,
    identify_gallery: Vec<PrintData>,
    listener: Option<Box<dyn DeviceListener>>,
    outbox: VecDeque<DeviceEvent>,
    dispatching: bool,
}

impl std::fmt::Debug for ImgDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImgDevice")
            .field("driver", &self.driver.info().name)
            .field("status", &self.status)
            .field("session", &self.session)
            .field("queued_events", &self.outbox.len())
            .finish()
    }
}

impl ImgDevice {
    /// Open a device on the given driver.
    ///
    /// `OpenComplete` is delivered to `listener` right away when the driver
    /// has no `open` capability, otherwise once the driver reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver refuses to open.
    pub fn open(
        driver: ImageDriver,
        engine: Box<dyn MatchEngine>,
        listener: impl DeviceListener + 'static,
        driver_data: u64,
    ) -> Result<Self> {
        let mut device = Self {
            driver: DriverAdapter::new(driver),
            engine,
            session: Session::new(),
            status: DeviceStatus::Opening,
            verify_data: None,
            identify_gallery: Vec::new(),
            listener: Some(Box::new(listener)),
            outbox: VecDeque::new(),
            dispatching: false,
        };

        info!(driver = %device.driver.info().name, "opening imaging device");
        if device.driver.open(driver_data)? == Completion::Immediate {
            device.open_complete(Ok(()));
        }
        Ok(device)
    }

    /// Driver finished opening the device.
    pub fn open_complete(&mut self, status: std::result::Result<(), DriverFault>) {
        if self.status != DeviceStatus::Opening {
            warn!(status = ?self.status, "ignoring unexpected open completion");
            return;
        }

        self.status = match status {
            Ok(()) => DeviceStatus::Open,
            Err(fault) => {
                error!("device open failed: {}", fault);
                DeviceStatus::Closed
            }
        };
        self.emit(DeviceEvent::OpenComplete(status));
    }

    /// Close the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not open or an action is still in
    /// progress.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.session.action() != Action::None {
            return Err(Error::Busy {
                current: self.session.action(),
            });
        }

        info!(driver = %self.driver.info().name, "closing imaging device");
        self.status = DeviceStatus::Closing;
        if self.driver.close() == Completion::Immediate {
            self.close_complete();
        }
        Ok(())
    }

    /// Driver finished closing the device. Session data is destroyed.
    pub fn close_complete(&mut self) {
        if self.status != DeviceStatus::Closing {
            warn!(status = ?self.status, "ignoring unexpected close completion");
            return;
        }

        self.status = DeviceStatus::Closed;
        self.session = Session::new();
        self.verify_data = None;
        self.identify_gallery.clear();
        self.emit(DeviceEvent::CloseComplete);
    }

    /// Start enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not open, busy, or the driver
    /// refuses activation.
    pub fn enroll_start(&mut self) -> Result<()> {
        self.acquire_start(Action::Enroll)
    }

    /// Start verification against `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not open, busy, the print comes
    /// from another driver, or the driver refuses activation.
    pub fn verify_start(&mut self, reference: PrintData) -> Result<()> {
        self.ensure_compatible(&reference)?;
        self.acquire_start(Action::Verify)?;
        self.verify_data = Some(reference);
        Ok(())
    }

    /// Start identification over `gallery`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not open, busy, any gallery print
    /// comes from another driver, or the driver refuses activation.
    pub fn identify_start(&mut self, gallery: Vec<PrintData>) -> Result<()> {
        for print in &gallery {
            self.ensure_compatible(print)?;
        }
        self.acquire_start(Action::Identify)?;
        self.identify_gallery = gallery;
        Ok(())
    }

    /// Start a raw capture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for an unconditional capture, which
    /// imaging devices cannot do, and otherwise the same errors as the other
    /// start operations.
    pub fn capture_start(&mut self, unconditional: bool) -> Result<()> {
        if unconditional {
            return Err(Error::Unsupported(
                "unconditional capture on imaging device".to_string(),
            ));
        }
        self.acquire_start(Action::Capture)
    }

    /// Stop enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionMismatch`] if enrollment is not running.
    pub fn enroll_stop(&mut self) -> Result<()> {
        self.acquire_stop(Action::Enroll)
    }

    /// Stop verification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionMismatch`] if verification is not running.
    pub fn verify_stop(&mut self) -> Result<()> {
        self.acquire_stop(Action::Verify)
    }

    /// Stop identification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionMismatch`] if identification is not running.
    pub fn identify_stop(&mut self) -> Result<()> {
        self.acquire_stop(Action::Identify)
    }

    /// Stop capture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActionMismatch`] if capture is not running.
    pub fn capture_stop(&mut self) -> Result<()> {
        self.acquire_stop(Action::Capture)
    }

    fn acquire_start(&mut self, action: Action) -> Result<()> {
        self.ensure_open()?;
        self.session.begin(action)?;
        debug!(%action, "starting action");

        if let Err(e) = self.driver.activate(DeviceState::AwaitFingerOn) {
            error!(%action, "activation request failed: {}", e);
            self.session.end();
            return Err(e.into());
        }
        Ok(())
    }

    fn acquire_stop(&mut self, action: Action) -> Result<()> {
        let current = self.session.action();
        if current != action {
            return Err(Error::ActionMismatch {
                requested: action,
                current,
            });
        }
        if self.session.state() == AcquireState::Deactivating {
            debug!(%action, "stop already in progress");
            return Ok(());
        }

        debug!(%action, state = %self.session.state(), "stopping action");
        self.session.force_state(AcquireState::Deactivating);
        self.session.discard();
        self.driver.deactivate();
        Ok(())
    }

    /// Driver finished activating the sensor.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal inconsistency.
    pub fn activate_complete(&mut self, status: std::result::Result<(), DriverFault>) -> Result<()> {
        let action = self.session.action();
        if action == Action::None {
            error!("activation completed with no action");
            return Ok(());
        }
        let state = self.session.state();
        if matches!(state, AcquireState::Idle | AcquireState::Deactivating) {
            debug!(%action, %state, "ignoring activation completion");
            return Ok(());
        }

        if let Err(fault) = status {
            error!(%action, "activation failed: {}", fault);
            if state == AcquireState::Activating {
                self.session.transition_to(AcquireState::Idle)?;
            } else {
                self.session.drop_result();
                self.session.acquire.clear();
                self.session.force_state(AcquireState::Idle);
            }
            self.emit(DeviceEvent::Started { action, status });
            return Ok(());
        }

        self.emit(DeviceEvent::Started { action, status });

        // The listener may have stopped the action.
        if self.session.action() == action && self.session.state() == AcquireState::Activating {
            self.session.transition_to(AcquireState::AwaitFingerOn)?;
            self.request_sensor_state(DeviceState::AwaitFingerOn);
        }
        Ok(())
    }

    /// Driver finished deactivating the sensor. The device is idle again.
    pub fn deactivate_complete(&mut self) {
        let action = self.session.action();
        if action == Action::None {
            error!("deactivation completed with no action");
            return;
        }

        self.session.end();
        self.verify_data = None;
        self.identify_gallery.clear();
        self.emit(DeviceEvent::Stopped { action });
    }

    /// Driver reports a finger placed on or lifted from the sensor.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal inconsistency.
    pub fn report_finger_status(&mut self, present: bool) -> Result<()> {
        let state = self.session.state();
        debug!(present, %state, "finger status");

        if present && state == AcquireState::AwaitFingerOn {
            self.request_sensor_state(DeviceState::Capture);
            self.session.transition_to(AcquireState::AwaitImage)?;
            return Ok(());
        }
        if present || state != AcquireState::AwaitFingerOff {
            debug!(present, %state, "ignoring finger status");
            return Ok(());
        }

        self.deliver_result()
    }

    /// Driver captured an image.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal inconsistency.
    pub fn image_captured(&mut self, image: Image) -> Result<()> {
        let state = self.session.state();
        if state != AcquireState::AwaitImage {
            debug!(%state, "ignoring image");
            return Ok(());
        }
        if self.session.result.is_some() {
            debug!("not overwriting pending result");
            return Ok(());
        }

        let result = self.process_image(image)?;
        debug!(action = %self.session.action(), %result, "scan processed");
        self.session.result = Some(result);
        self.session.transition_to(AcquireState::AwaitFingerOff)?;
        self.request_sensor_state(DeviceState::AwaitFingerOff);
        Ok(())
    }

    /// Driver hit a fault. The failure is delivered at once with an empty
    /// payload and the scan in progress is abandoned: a session that was
    /// waiting for an image or a finger lift goes back to waiting for a
    /// finger. A stage folded into the enrollment for an undelivered result
    /// is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal inconsistency.
    pub fn session_error(&mut self, fault: DriverFault) -> Result<()> {
        let action = self.session.action();
        debug!(%action, "session error: {}", fault);
        if action == Action::None {
            error!("session error with no action: {}", fault);
            return Ok(());
        }

        let state = self.session.state();
        self.session.acquire.clear();
        self.session.drop_result();

        let event = match action {
            Action::Enroll => DeviceEvent::EnrollStageCompleted {
                result: Err(fault.into()),
                print: None,
                image: None,
            },
            Action::Verify => DeviceEvent::VerifyResult {
                result: Err(fault.into()),
                image: None,
            },
            Action::Identify => DeviceEvent::IdentifyResult {
                result: Err(fault.into()),
                match_offset: None,
                image: None,
            },
            Action::Capture => DeviceEvent::CaptureResult {
                result: Err(fault.into()),
                image: None,
            },
            Action::None => return Ok(()),
        };
        self.emit(event);

        // The listener may have stopped the action.
        if matches!(state, AcquireState::AwaitImage | AcquireState::AwaitFingerOff)
            && self.session.action() == action
            && self.session.state() == state
        {
            self.session.force_state(AcquireState::AwaitFingerOn);
            self.request_sensor_state(DeviceState::AwaitFingerOn);
        }
        Ok(())
    }

    /// Driver abandons the current scan with `result`, which is delivered
    /// when the finger is lifted.
    pub fn abort_scan(&mut self, result: ActionResult) {
        let state = self.session.state();
        if self.session.action() == Action::None || !state.accepts_abort() {
            warn!(%state, "ignoring scan abort");
            return;
        }

        debug!(%result, "scan aborted");
        self.session.drop_result();
        self.session.result = Some(result);
        self.session.force_state(AcquireState::AwaitFingerOff);
        self.request_sensor_state(DeviceState::AwaitFingerOff);
    }

    /// Apply one driver callback.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal inconsistency.
    pub fn handle_callback(&mut self, callback: DriverCallback) -> Result<()> {
        match callback {
            DriverCallback::OpenComplete(status) => self.open_complete(status),
            DriverCallback::CloseComplete => self.close_complete(),
            DriverCallback::ActivateComplete(status) => self.activate_complete(status)?,
            DriverCallback::DeactivateComplete => self.deactivate_complete(),
            DriverCallback::FingerStatus(present) => self.report_finger_status(present)?,
            DriverCallback::ImageCaptured(image) => self.image_captured(image)?,
            DriverCallback::SessionError(fault) => self.session_error(fault)?,
            DriverCallback::AbortScan(result) => self.abort_scan(result),
        }
        Ok(())
    }

    pub fn action(&self) -> Action {
        self.session.action()
    }

    pub fn acquire_state(&self) -> AcquireState {
        self.session.state()
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == DeviceStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == DeviceStatus::Closed
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.session.history().iter()
    }

    pub fn driver_info(&self) -> &DriverInfo {
        self.driver.info()
    }

    /// Number of captures needed to complete an enrollment.
    pub fn enroll_stages(&self) -> u8 {
        self.driver.config().enroll_stages
    }

    /// Declared sensor width, `0` when images carry their own.
    pub fn img_width(&self) -> u32 {
        self.driver.config().img_width
    }

    /// Declared sensor height, `0` when images carry their own.
    pub fn img_height(&self) -> u32 {
        self.driver.config().img_height
    }

    /// Replace the listener. Takes effect for the next event.
    pub fn set_listener(&mut self, listener: impl DeviceListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status != DeviceStatus::Open {
            return Err(Error::DeviceClosed);
        }
        Ok(())
    }

    fn ensure_compatible(&self, print: &PrintData) -> Result<()> {
        let info = self.driver.info();
        if !print.is_compatible(&info.name, info.devtype) {
            return Err(Error::IncompatiblePrint {
                print_driver: print.driver().to_string(),
                device_driver: info.name.clone(),
            });
        }
        Ok(())
    }

    fn request_sensor_state(&mut self, state: DeviceState) {
        if let Err(e) = self.driver.change_state(state) {
            warn!(%state, "sensor state change failed: {}", e);
        }
    }

    /// Turn a raw image into the result of the running action.
    fn process_image(&mut self, raw: Image) -> Result<ActionResult> {
        let action = self.session.action();
        let config = self.driver.config().clone();

        let image = match intake::prepare(raw, &config) {
            Ok(image) => image,
            Err(e) => {
                debug!("rejecting image: {}", e);
                return Ok(ActionResult::Retry(RetryReason::General));
            }
        };
        self.session.acquire.store_image(image);

        if action.needs_features() {
            let extracted = match self.session.acquire.image() {
                Some(image) => self.engine.extract(image),
                None => return Err(Error::InvariantViolation("image vanished".to_string())),
            };
            let item = match extracted {
                Ok(item) => item,
                Err(e) => {
                    debug!("feature extraction failed: {}", e);
                    return Ok(ActionResult::Retry(RetryReason::General));
                }
            };
            if item.minutiae_count() < config.min_minutiae {
                debug!(
                    count = item.minutiae_count(),
                    min = config.min_minutiae,
                    "not enough minutiae"
                );
                return Ok(ActionResult::Retry(RetryReason::General));
            }

            let info = self.driver.info();
            self.session
                .acquire
                .store_print(PrintData::from_item(info.name.clone(), info.devtype, item));
        }

        match action {
            Action::Enroll => self.enroll_stage(config.enroll_stages),
            Action::Verify => self.verify_probe(config.match_threshold()),
            Action::Identify => self.identify_probe(config.match_threshold()),
            Action::Capture => Ok(ActionResult::Capture(CaptureResult::Complete)),
            Action::None => Err(Error::InvariantViolation(
                "image accepted with no action".to_string(),
            )),
        }
    }

    fn enroll_stage(&mut self, stages: u8) -> Result<ActionResult> {
        let item = self
            .session
            .acquire
            .take_print()
            .and_then(|mut print| print.take_first())
            .ok_or_else(|| Error::InvariantViolation("enroll scan without fragment".to_string()))?;

        let info = self.driver.info();
        let session = &mut self.session;
        let result = policy::enroll_stage(
            &mut session.enroll_data,
            &mut session.enroll_stage,
            stages,
            item,
            &info.name,
            info.devtype,
        );
        session.stage_unreported = true;
        Ok(result)
    }

    fn verify_probe(&self, threshold: i32) -> Result<ActionResult> {
        let (Some(reference), Some(probe)) = (self.verify_data.as_ref(), self.session.acquire.print())
        else {
            return Err(Error::InvariantViolation(
                "verify scan without reference or probe".to_string(),
            ));
        };
        Ok(policy::verify(self.engine.as_ref(), reference, probe, threshold))
    }

    fn identify_probe(&mut self, threshold: i32) -> Result<ActionResult> {
        let Some(probe) = self.session.acquire.print() else {
            return Err(Error::InvariantViolation(
                "identify scan without probe".to_string(),
            ));
        };
        let (result, offset) =
            policy::identify(self.engine.as_ref(), probe, &self.identify_gallery, threshold);
        self.session.identify_match_offset = offset;
        Ok(result)
    }

    /// Hand the pending result to the listener after the finger was lifted.
    fn deliver_result(&mut self) -> Result<()> {
        let action = self.session.action();
        self.session.stage_unreported = false;
        let Some(result) = self.session.result.take() else {
            // Result already delivered and the action is waiting to be stopped.
            debug!(%action, "finger lifted with no pending result");
            return Ok(());
        };
        let image = self.session.acquire.take_image();
        self.session.acquire.clear();

        let retry = match action {
            Action::Enroll => {
                let result = result.into_enroll();
                let print = match result {
                    Ok(EnrollResult::Complete) => self.session.enroll_data.take(),
                    _ => None,
                };
                let again = matches!(result, Ok(r) if r.continues());
                self.emit(DeviceEvent::EnrollStageCompleted {
                    result,
                    print,
                    image,
                });
                again
            }
            Action::Verify => {
                let result = result.into_verify();
                let again = matches!(result, Ok(VerifyResult::Retry(_)));
                self.emit(DeviceEvent::VerifyResult { result, image });
                again
            }
            Action::Identify => {
                let result = result.into_verify();
                let match_offset = match result {
                    Ok(VerifyResult::Match) => self.session.identify_match_offset,
                    _ => None,
                };
                let again = matches!(result, Ok(VerifyResult::Retry(_)));
                self.emit(DeviceEvent::IdentifyResult {
                    result,
                    match_offset,
                    image,
                });
                again
            }
            Action::Capture => {
                let result = result.into_capture();
                self.emit(DeviceEvent::CaptureResult { result, image });
                false
            }
            Action::None => {
                return Err(Error::InvariantViolation(
                    "result pending with no action".to_string(),
                ));
            }
        };

        // The listener may have stopped or restarted the action.
        if retry
            && self.session.action() == action
            && self.session.state() == AcquireState::AwaitFingerOff
        {
            self.session.transition_to(AcquireState::AwaitFingerOn)?;
            self.request_sensor_state(DeviceState::AwaitFingerOn);
        }
        Ok(())
    }

    /// Queue an event and, unless a delivery is already running, deliver
    /// the queue in order.
    fn emit(&mut self, event: DeviceEvent) {
        self.outbox.push_back(event);
        if self.dispatching {
            return;
        }

        self.dispatching = true;
        while let Some(event) = self.outbox.pop_front() {
            debug!(event = event.name(), "delivering event");
            let Some(mut listener) = self.listener.take() else {
                warn!(event = event.name(), "no listener, dropping event");
                continue;
            };
            listener.on_event(self, event);
            if self.listener.is_none() {
                self.listener = Some(listener);
            }
        }
        self.dispatching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fprint_biometric::{MinutiaeEngine, PrintItem};
    use fprint_hardware::DriverConfig;
    use std::sync::{Arc, Mutex};

    type Events = Arc<Mutex<Vec<DeviceEvent>>>;

    /// Device on a driver without any capabilities, so every request
    /// completes synchronously.
    fn bare_device(config: DriverConfig) -> (ImgDevice, Events) {
        let driver = ImageDriver::builder(DriverInfo::new("bare", "Bare Sensor"))
            .config(config)
            .build()
            .unwrap();
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let device = ImgDevice::open(
            driver,
            Box::new(MinutiaeEngine::default()),
            move |_: &mut ImgDevice, event: DeviceEvent| sink.lock().unwrap().push(event),
            0,
        )
        .unwrap();
        (device, events)
    }

    fn image(value: u8) -> Image {
        Image::new(4, 4, vec![value; 16])
    }

    #[test]
    fn test_open_without_capability_completes_immediately() {
        let (device, events) = bare_device(DriverConfig::default());
        assert!(device.is_open());
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[DeviceEvent::OpenComplete(Ok(()))]
        );
    }

    #[test]
    fn test_start_requires_open_device() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.close().unwrap();
        assert!(device.is_closed());
        assert!(matches!(device.enroll_start(), Err(Error::DeviceClosed)));
    }

    #[test]
    fn test_activation_without_capability_waits_for_completion() {
        let (mut device, events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();
        assert_eq!(device.acquire_state(), AcquireState::Activating);

        device.activate_complete(Ok(())).unwrap();
        assert_eq!(device.acquire_state(), AcquireState::AwaitFingerOn);
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&DeviceEvent::Started {
                action: Action::Capture,
                status: Ok(())
            })
        );
    }

    #[test]
    fn test_activation_failure_keeps_action() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();

        let fault = DriverFault::from_code(-5).unwrap();
        device.activate_complete(Err(fault)).unwrap();
        assert_eq!(device.acquire_state(), AcquireState::Idle);
        assert_eq!(device.action(), Action::Capture);
    }

    #[test]
    fn test_unconditional_capture_unsupported() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        assert!(matches!(
            device.capture_start(true),
            Err(Error::Unsupported(_))
        ));
        assert_eq!(device.action(), Action::None);
    }

    #[test]
    fn test_capture_cycle() {
        let (mut device, events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();
        device.activate_complete(Ok(())).unwrap();

        device.report_finger_status(true).unwrap();
        assert_eq!(device.acquire_state(), AcquireState::AwaitImage);

        device.image_captured(image(0)).unwrap();
        assert_eq!(device.acquire_state(), AcquireState::AwaitFingerOff);
        assert!(device.session().result().is_some());

        device.report_finger_status(false).unwrap();
        let last = events.lock().unwrap().last().cloned().unwrap();
        match last {
            DeviceEvent::CaptureResult { result, image } => {
                assert_eq!(result, Ok(CaptureResult::Complete));
                assert_eq!(image.map(|i| i.data.len()), Some(16));
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert_eq!(device.acquire_state(), AcquireState::AwaitFingerOff);
        assert!(device.session().acquisition().is_empty());
        assert!(device.session().result().is_none());
    }

    #[test]
    fn test_image_not_overwriting_pending_result() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();
        device.activate_complete(Ok(())).unwrap();
        device.report_finger_status(true).unwrap();

        device.session.result = Some(ActionResult::Capture(CaptureResult::Fail));
        device.image_captured(image(0)).unwrap();

        assert_eq!(device.acquire_state(), AcquireState::AwaitImage);
        assert_eq!(
            device.session().result(),
            Some(&ActionResult::Capture(CaptureResult::Fail))
        );
        assert!(device.session().acquisition().is_empty());
    }

    #[test]
    fn test_insane_image_yields_retry() {
        let config = DriverConfig::default().with_dimensions(8, 8);
        let (mut device, _events) = bare_device(config);
        device.capture_start(false).unwrap();
        device.activate_complete(Ok(())).unwrap();
        device.report_finger_status(true).unwrap();

        device.image_captured(image(0)).unwrap();
        assert_eq!(
            device.session().result(),
            Some(&ActionResult::Retry(RetryReason::General))
        );
    }

    #[test]
    fn test_abort_forces_await_finger_off() {
        let (mut device, events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();
        device.activate_complete(Ok(())).unwrap();

        device.abort_scan(ActionResult::Retry(RetryReason::CenterFinger));
        assert_eq!(device.acquire_state(), AcquireState::AwaitFingerOff);

        device.report_finger_status(false).unwrap();
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&DeviceEvent::CaptureResult {
                result: Ok(CaptureResult::Retry(RetryReason::CenterFinger)),
                image: None
            })
        );
    }

    #[test]
    fn test_abort_ignored_when_idle() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.abort_scan(ActionResult::Retry(RetryReason::General));
        assert_eq!(device.acquire_state(), AcquireState::Idle);
        assert!(device.session().result().is_none());
    }

    #[test]
    fn test_mismatched_result_is_reported_as_error() {
        let (mut device, events) = bare_device(DriverConfig::default());
        device.capture_start(false).unwrap();
        device.activate_complete(Ok(())).unwrap();

        device.abort_scan(ActionResult::Verify(VerifyResult::Match));
        device.report_finger_status(false).unwrap();

        let last = events.lock().unwrap().last().cloned().unwrap();
        assert!(matches!(
            last,
            DeviceEvent::CaptureResult {
                result: Err(fprint_core::ScanError::ResultMismatch { .. }),
                ..
            }
        ));
    }

    #[test]
    fn test_verify_rejects_foreign_print() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        let print = PrintData::from_item("other", 0, PrintItem::default());

        let err = device.verify_start(print).unwrap_err();
        assert!(matches!(err, Error::IncompatiblePrint { .. }));
        assert_eq!(device.action(), Action::None);
    }

    #[test]
    fn test_stop_mismatch() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.enroll_start().unwrap();

        let err = device.verify_stop().unwrap_err();
        assert!(matches!(
            err,
            Error::ActionMismatch {
                requested: Action::Verify,
                current: Action::Enroll
            }
        ));
    }

    #[test]
    fn test_close_while_busy() {
        let (mut device, _events) = bare_device(DriverConfig::default());
        device.enroll_start().unwrap();
        assert!(matches!(device.close(), Err(Error::Busy { .. })));
        assert!(device.is_open());
    }

    #[test]
    fn test_declared_dimensions_reported() {
        let (device, _events) = bare_device(DriverConfig::default().with_dimensions(192, 160));
        assert_eq!(device.img_width(), 192);
        assert_eq!(device.img_height(), 160);
        assert_eq!(device.enroll_stages(), 5);
    }
}
