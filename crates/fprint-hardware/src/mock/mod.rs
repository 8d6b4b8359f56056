//! Mock driver implementations for testing and development.
//!
//! This module provides a simulated imaging sensor that can be controlled
//! programmatically without requiring physical hardware.

pub mod sensor;

// Re-export commonly used types
pub use sensor::{DriverCall, MockSensor, MockSensorHandle};
