use std::num::NonZeroI32;

use thiserror::Error;

use crate::types::Action;

#[derive(Error, Debug)]
pub enum Error {
    // Caller contract errors
    #[error("Device busy: {current} in progress")]
    Busy { current: Action },

    #[error("Cannot stop {requested}: current action is {current}")]
    ActionMismatch { requested: Action, current: Action },

    #[error("Device is not open")]
    DeviceClosed,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Print data from driver {print_driver} is not compatible with {device_driver}")]
    IncompatiblePrint {
        print_driver: String,
        device_driver: String,
    },

    // Driver errors
    #[error("Driver operation failed: {0}")]
    Driver(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    // Internal consistency
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure code reported by a driver.
///
/// Drivers report hardware and protocol faults as non-zero codes; a zero
/// code cannot be represented.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("driver fault (code {code})")]
pub struct DriverFault {
    pub code: NonZeroI32,
}

impl DriverFault {
    pub fn new(code: NonZeroI32) -> Self {
        Self { code }
    }

    /// Build a fault from a raw code, `None` when the code is zero.
    pub fn from_code(code: i32) -> Option<Self> {
        NonZeroI32::new(code).map(Self::new)
    }

    pub fn code(&self) -> i32 {
        self.code.get()
    }
}

/// Error half of a result delivered to the front-end.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The driver reported a hardware or protocol fault.
    #[error(transparent)]
    Driver(#[from] DriverFault),

    /// The matching engine returned a negative score.
    #[error("Comparison failed with engine code {code}")]
    Comparison { code: i32 },

    /// A pending result does not belong to the result space of the action.
    #[error("Result {result} cannot be reported for {action}")]
    ResultMismatch { action: Action, result: String },
}
