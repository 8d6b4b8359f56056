//! Feature extraction and matching engine boundary.
//!
//! The session core treats the engine as a pure function boundary: it turns
//! an image into a template fragment and compares prints into a similarity
//! score. Scores are raw engine output; negative values are engine error
//! codes and are never compared against a threshold.

use fprint_hardware::Image;

use crate::error::Result;
use crate::extract::extract_minutiae;
use crate::print::{PrintData, PrintItem};

/// Engine code returned when a comparison involves a print without fragments.
pub const ERROR_EMPTY_PRINT: i32 = -22;

/// Best gallery entry for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryScore {
    /// Highest score found, or a negative engine error code.
    pub score: i32,

    /// Gallery index of the highest score, `None` for an empty gallery or an error.
    pub index: Option<usize>,
}

/// Feature extraction and matching engine.
pub trait MatchEngine: Send {
    /// Derive a template fragment from a standardized image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be processed.
    fn extract(&self, image: &Image) -> Result<PrintItem>;

    /// Similarity between an enrolled print and a probe.
    fn compare(&self, enrolled: &PrintData, probe: &PrintData) -> i32;

    /// Best match for a probe across a gallery.
    ///
    /// The first negative score aborts the search and is returned as is.
    fn compare_gallery(&self, probe: &PrintData, gallery: &[PrintData]) -> GalleryScore {
        let mut best = GalleryScore {
            score: 0,
            index: None,
        };

        for (index, enrolled) in gallery.iter().enumerate() {
            let score = self.compare(enrolled, probe);
            if score < 0 {
                return GalleryScore { score, index: None };
            }
            if best.index.is_none() || score > best.score {
                best = GalleryScore {
                    score,
                    index: Some(index),
                };
            }
        }

        best
    }
}

/// Reference engine pairing minutiae by position, direction and kind.
///
/// Each probe minutia pairs with at most one enrolled minutia. The score of
/// two fragments is the number of pairs times `score_per_pair`; the score of
/// two prints is the best score over all fragment combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinutiaeEngine {
    /// Maximum pixel distance between paired minutiae.
    pub max_distance: u32,

    /// Maximum direction difference between paired minutiae, in degrees.
    pub max_direction_diff: u16,

    /// Score contributed by each pair.
    pub score_per_pair: i32,
}

impl Default for MinutiaeEngine {
    fn default() -> Self {
        Self {
            max_distance: 2,
            max_direction_diff: 30,
            score_per_pair: 5,
        }
    }
}

impl MinutiaeEngine {
    fn fragment_score(&self, enrolled: &PrintItem, probe: &PrintItem) -> i32 {
        let max_distance_sq = (self.max_distance as u64).pow(2);
        let mut used = vec![false; enrolled.minutiae().len()];
        let mut pairs = 0;

        for candidate in probe.minutiae() {
            let found = enrolled.minutiae().iter().enumerate().position(|(i, m)| {
                !used[i]
                    && m.kind == candidate.kind
                    && m.distance_sq(candidate) <= max_distance_sq
                    && m.direction_diff(candidate) <= self.max_direction_diff
            });
            if let Some(i) = found {
                used[i] = true;
                pairs += 1;
            }
        }

        pairs * self.score_per_pair
    }
}

impl MatchEngine for MinutiaeEngine {
    fn extract(&self, image: &Image) -> Result<PrintItem> {
        extract_minutiae(image)
    }

    fn compare(&self, enrolled: &PrintData, probe: &PrintData) -> i32 {
        if enrolled.is_empty() || probe.is_empty() {
            return ERROR_EMPTY_PRINT;
        }

        enrolled
            .items()
            .flat_map(|e| probe.items().map(move |p| (e, p)))
            .map(|(e, p)| self.fragment_score(e, p))
            .max()
            .unwrap_or(0)
    }
}
