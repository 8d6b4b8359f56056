//! Error types for driver operations.
//!
//! This module defines the errors a driver backend returns from its
//! capability calls, such as a disconnected sensor, a failed USB transfer, or
//! an operation the backend refuses in its current mode.

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during driver operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Sensor activation failed.
    #[error("Activation failed: {message}")]
    ActivationFailed { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new activation failed error.
    pub fn activation_failed(message: impl Into<String>) -> Self {
        Self::ActivationFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

impl From<HardwareError> for fprint_core::Error {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::ConfigurationError { message } => fprint_core::Error::Config(message),
            HardwareError::Unsupported { operation } => fprint_core::Error::Unsupported(operation),
            other => fprint_core::Error::Driver(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("uru4000");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: uru4000");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(3000);
        assert_eq!(error.to_string(), "Operation timeout after 3000ms");
    }

    #[test]
    fn test_activation_failed_error() {
        let error = HardwareError::activation_failed("sensor did not power up");
        assert_eq!(
            error.to_string(),
            "Activation failed: sensor did not power up"
        );
    }

    #[test]
    fn test_into_core_error() {
        let error: fprint_core::Error = HardwareError::configuration("zero stages").into();
        assert!(matches!(error, fprint_core::Error::Config(_)));

        let error: fprint_core::Error = HardwareError::unsupported("capture").into();
        assert!(matches!(error, fprint_core::Error::Unsupported(_)));

        let error: fprint_core::Error = HardwareError::communication("stall").into();
        match error {
            fprint_core::Error::Driver(message) => {
                assert_eq!(message, "Communication error: stall")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
