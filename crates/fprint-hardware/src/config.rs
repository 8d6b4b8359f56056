//! Driver-declared configuration.
//!
//! These values are fixed by the driver and read by the session core; callers
//! cannot change them at runtime. Zero values mean "not declared" and fall
//! back to the core defaults.

use fprint_core::constants::{
    DEFAULT_ENROLL_STAGES, DEFAULT_MATCH_THRESHOLD, MAX_ENROLL_STAGES, MIN_ACCEPTABLE_MINUTIAE,
};
use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, Result};

/// Fixed attributes a driver declares for its sensor.
///
/// # Examples
///
/// ```
/// use fprint_hardware::config::DriverConfig;
///
/// let config = DriverConfig::default();
/// assert_eq!(config.match_threshold(), 40);
/// assert_eq!(config.enroll_stages, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Sensor image width, `0` to use the width reported with each image.
    pub img_width: u32,

    /// Sensor image height, `0` to use the height reported with each image.
    pub img_height: u32,

    /// Match score threshold, `0` for the default.
    pub bz3_threshold: i32,

    /// Number of captures needed to complete an enrollment.
    pub enroll_stages: u8,

    /// Minimum minutiae a template fragment must carry.
    pub min_minutiae: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            img_width: 0,
            img_height: 0,
            bz3_threshold: 0,
            enroll_stages: DEFAULT_ENROLL_STAGES,
            min_minutiae: MIN_ACCEPTABLE_MINUTIAE,
        }
    }
}

impl DriverConfig {
    /// Set fixed sensor dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.img_width = width;
        self.img_height = height;
        self
    }

    /// Set the match score threshold.
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.bz3_threshold = threshold;
        self
    }

    /// Set the number of enrollment stages.
    pub fn with_enroll_stages(mut self, stages: u8) -> Self {
        self.enroll_stages = stages;
        self
    }

    /// Threshold applied to similarity scores.
    pub fn match_threshold(&self) -> i32 {
        if self.bz3_threshold == 0 {
            DEFAULT_MATCH_THRESHOLD
        } else {
            self.bz3_threshold
        }
    }

    /// Declared width, `None` when the driver leaves it to the image.
    pub fn declared_width(&self) -> Option<u32> {
        (self.img_width > 0).then_some(self.img_width)
    }

    /// Declared height, `None` when the driver leaves it to the image.
    pub fn declared_height(&self) -> Option<u32> {
        (self.img_height > 0).then_some(self.img_height)
    }

    /// Check the configuration for values the core cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stage count is zero or above the supported maximum
    /// - The threshold is negative
    pub fn validate(&self) -> Result<()> {
        if self.enroll_stages == 0 || self.enroll_stages > MAX_ENROLL_STAGES {
            return Err(HardwareError::configuration(format!(
                "Enroll stages must be 1-{}, got {}",
                MAX_ENROLL_STAGES, self.enroll_stages
            )));
        }
        if self.bz3_threshold < 0 {
            return Err(HardwareError::configuration(format!(
                "Match threshold cannot be negative, got {}",
                self.bz3_threshold
            )));
        }
        Ok(())
    }
}
