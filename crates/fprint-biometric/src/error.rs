//! Error types for feature extraction and print data handling.

/// Result type alias for biometric operations.
pub type Result<T> = std::result::Result<T, BiometricError>;

/// Errors that can occur while extracting or storing prints.
#[derive(Debug, thiserror::Error)]
pub enum BiometricError {
    /// The image cannot be processed.
    #[error("Image rejected: {message}")]
    ImageRejected { message: String },

    /// Print data could not be encoded or decoded.
    #[error("Print data serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BiometricError {
    /// Create a new image rejected error.
    pub fn image_rejected(message: impl Into<String>) -> Self {
        Self::ImageRejected {
            message: message.into(),
        }
    }
}
