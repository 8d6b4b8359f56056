//! Core constants for the imaging device session.
//!
//! These values are the defaults a driver falls back to when it does not
//! declare its own. A driver declaring `0` for the match threshold or the
//! image dimensions means "use the default" (or "use the image's own size").
//!
//! # Usage
//!
//! ```
//! use fprint_core::constants::*;
//!
//! fn effective_threshold(declared: i32) -> i32 {
//!     if declared == 0 { DEFAULT_MATCH_THRESHOLD } else { declared }
//! }
//!
//! assert_eq!(effective_threshold(0), 40);
//! assert_eq!(effective_threshold(25), 25);
//! ```

// ============================================================================
// Quality Gate
// ============================================================================

/// Minimum number of minutiae a template fragment must carry.
///
/// Fragments below this count are discarded before any action policy runs
/// and the current stage is reported as a retry.
pub const MIN_ACCEPTABLE_MINUTIAE: usize = 10;

// ============================================================================
// Matching
// ============================================================================

/// Match score threshold used when the driver declares none.
///
/// A similarity score at or above the threshold is a match; a score in
/// `0..threshold` is a non-match; a negative score is an engine error.
pub const DEFAULT_MATCH_THRESHOLD: i32 = 40;

// ============================================================================
// Enrollment
// ============================================================================

/// Number of captures needed to complete an enrollment.
pub const DEFAULT_ENROLL_STAGES: u8 = 5;

/// Upper bound accepted for a driver-declared stage count.
pub const MAX_ENROLL_STAGES: u8 = 20;
