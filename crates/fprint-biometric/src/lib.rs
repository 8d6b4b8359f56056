//! Print data and matching engine for imaging fingerprint devices.
//!
//! This crate provides:
//!
//! - [`PrintData`]: the ownership container for template fragments, used both
//!   for enrollment accumulation and for probes.
//! - [`MatchEngine`]: the extraction and comparison boundary the session core
//!   calls into, with [`MinutiaeEngine`] as a reference implementation.
//! - [`synthetic`]: generated finger images with a known number of minutiae.
//!
//! # Examples
//!
//! ```
//! use fprint_biometric::{MatchEngine, MinutiaeEngine, PrintData, synthetic};
//!
//! let engine = MinutiaeEngine::default();
//! let item = engine.extract(&synthetic::finger(64, 64, 6, 0)).unwrap();
//! let print = PrintData::from_item("mock", 0, item);
//!
//! assert!(engine.compare(&print, &print) >= 40);
//! ```

pub mod engine;
pub mod error;
pub mod extract;
pub mod print;
pub mod synthetic;

pub use engine::{ERROR_EMPTY_PRINT, GalleryScore, MatchEngine, MinutiaeEngine};
pub use error::{BiometricError, Result};
pub use print::{Minutia, MinutiaKind, PrintData, PrintDataType, PrintItem};
