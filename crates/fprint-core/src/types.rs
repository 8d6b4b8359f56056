//! Shared vocabulary for imaging device sessions.
//!
//! The session tracks an [`Action`] (what the caller asked for) and an
//! [`AcquireState`] (where the acquisition currently is). Results are kept in
//! an [`ActionResult`] while pending and are converted to the result space of
//! the running action when delivered.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Operation currently requested on an imaging device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    None,
    Enroll,
    Verify,
    Identify,
    Capture,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::None => "none",
            Action::Enroll => "enroll",
            Action::Verify => "verify",
            Action::Identify => "identify",
            Action::Capture => "capture",
        };
        write!(f, "{}", name)
    }
}

impl Action {
    /// Whether captured images for this action go through feature extraction.
    pub fn needs_features(&self) -> bool {
        matches!(self, Action::Enroll | Action::Verify | Action::Identify)
    }
}

/// Acquisition state of a session.
///
/// # Transitions
///
/// - Idle → Activating (operation start)
/// - Activating → AwaitFingerOn (activation success) or Idle (activation failure)
/// - AwaitFingerOn → AwaitImage (finger present)
/// - AwaitImage → AwaitFingerOff (image processed or abort)
/// - AwaitFingerOff → AwaitFingerOn (retry) or stays until stop
/// - any → Deactivating (stop) → Idle (deactivation complete)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireState {
    #[default]
    Idle,
    Activating,
    AwaitFingerOn,
    AwaitImage,
    AwaitFingerOff,
    Deactivating,
}

impl fmt::Display for AcquireState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquireState::Idle => "Idle",
            AcquireState::Activating => "Activating",
            AcquireState::AwaitFingerOn => "AwaitFingerOn",
            AcquireState::AwaitImage => "AwaitImage",
            AcquireState::AwaitFingerOff => "AwaitFingerOff",
            AcquireState::Deactivating => "Deactivating",
        };
        write!(f, "{}", name)
    }
}

impl AcquireState {
    /// Check if the acquisition can move from this state to `target`.
    ///
    /// Stop (to `Deactivating`) and abort (to `AwaitFingerOff`) are forced
    /// transitions and are not subject to this check.
    ///
    /// # Examples
    ///
    /// ```
    /// use fprint_core::AcquireState;
    ///
    /// assert!(AcquireState::Idle.can_transition_to(&AcquireState::Activating));
    /// assert!(!AcquireState::Idle.can_transition_to(&AcquireState::AwaitImage));
    /// ```
    pub fn can_transition_to(&self, target: &AcquireState) -> bool {
        matches!(
            (self, target),
            (AcquireState::Idle, AcquireState::Activating)
                | (
                    AcquireState::Activating,
                    AcquireState::AwaitFingerOn | AcquireState::Idle
                )
                | (AcquireState::AwaitFingerOn, AcquireState::AwaitImage)
                | (AcquireState::AwaitImage, AcquireState::AwaitFingerOff)
                | (AcquireState::AwaitFingerOff, AcquireState::AwaitFingerOn)
                | (AcquireState::Deactivating, AcquireState::Idle)
        )
    }

    /// Whether an abort can be applied in this state.
    pub fn accepts_abort(&self) -> bool {
        matches!(
            self,
            AcquireState::Activating
                | AcquireState::AwaitFingerOn
                | AcquireState::AwaitImage
                | AcquireState::AwaitFingerOff
        )
    }
}

/// Sensor mode requested from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Inactive,
    AwaitFingerOn,
    Capture,
    AwaitFingerOff,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceState::Inactive => "inactive",
            DeviceState::AwaitFingerOn => "await-finger-on",
            DeviceState::Capture => "capture",
            DeviceState::AwaitFingerOff => "await-finger-off",
        };
        write!(f, "{}", name)
    }
}

/// Why a scan has to be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    /// Scan was unusable (bad image, too few features).
    #[default]
    General,
    /// Swipe was too short.
    TooShort,
    /// Finger was not centered on the sensor.
    CenterFinger,
    /// Finger must be lifted before scanning again.
    RemoveFinger,
}

/// Result space of an enrollment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollResult {
    /// All stages done; the enrolled print is delivered with this result.
    Complete,
    /// Enrollment failed and cannot continue.
    Fail,
    /// Stage accepted, more stages needed.
    Pass,
    /// Stage rejected, scan again.
    Retry(RetryReason),
}

impl EnrollResult {
    /// Whether enrollment continues with another stage after this result.
    pub fn continues(&self) -> bool {
        matches!(self, EnrollResult::Pass | EnrollResult::Retry(_))
    }
}

/// Result space of verify and identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyResult {
    NoMatch,
    Match,
    Retry(RetryReason),
}

/// Result space of capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureResult {
    Complete,
    Fail,
    Retry(RetryReason),
}

/// Result pending delivery for the running action.
///
/// Retry and error results are shared across actions; the other variants
/// belong to exactly one result space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Enroll(EnrollResult),
    Verify(VerifyResult),
    Capture(CaptureResult),
    Retry(RetryReason),
    Error(ScanError),
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Enroll(r) => write!(f, "enroll {:?}", r),
            ActionResult::Verify(r) => write!(f, "verify {:?}", r),
            ActionResult::Capture(r) => write!(f, "capture {:?}", r),
            ActionResult::Retry(reason) => write!(f, "retry ({:?})", reason),
            ActionResult::Error(e) => write!(f, "error: {}", e),
        }
    }
}

impl From<ScanError> for ActionResult {
    fn from(error: ScanError) -> Self {
        ActionResult::Error(error)
    }
}

impl ActionResult {
    /// Whether this result asks for another scan.
    pub fn is_retry(&self) -> bool {
        matches!(
            self,
            ActionResult::Retry(_)
                | ActionResult::Enroll(EnrollResult::Retry(_))
                | ActionResult::Verify(VerifyResult::Retry(_))
                | ActionResult::Capture(CaptureResult::Retry(_))
        )
    }

    /// Convert into the enroll result space.
    pub fn into_enroll(self) -> Result<EnrollResult, ScanError> {
        match self {
            ActionResult::Enroll(r) => Ok(r),
            ActionResult::Retry(reason) => Ok(EnrollResult::Retry(reason)),
            ActionResult::Error(e) => Err(e),
            other => Err(other.mismatch(Action::Enroll)),
        }
    }

    /// Convert into the verify/identify result space.
    pub fn into_verify(self) -> Result<VerifyResult, ScanError> {
        match self {
            ActionResult::Verify(r) => Ok(r),
            ActionResult::Retry(reason) => Ok(VerifyResult::Retry(reason)),
            ActionResult::Error(e) => Err(e),
            other => Err(other.mismatch(Action::Verify)),
        }
    }

    /// Convert into the capture result space.
    pub fn into_capture(self) -> Result<CaptureResult, ScanError> {
        match self {
            ActionResult::Capture(r) => Ok(r),
            ActionResult::Retry(reason) => Ok(CaptureResult::Retry(reason)),
            ActionResult::Error(e) => Err(e),
            other => Err(other.mismatch(Action::Capture)),
        }
    }

    fn mismatch(self, action: Action) -> ScanError {
        ScanError::ResultMismatch {
            action,
            result: self.to_string(),
        }
    }
}
