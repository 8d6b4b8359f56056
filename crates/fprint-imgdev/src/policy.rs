//! Scoring and enrollment policy.
//!
//! Turns engine output into results of the running action. Negative scores
//! are engine errors and never reach the threshold comparison.

use fprint_biometric::{MatchEngine, PrintData, PrintItem};
use fprint_core::{ActionResult, EnrollResult, ScanError, VerifyResult};

/// Fold one fragment into the enrollment template.
///
/// The fragment is prepended to the accumulator, which is created on the
/// first stage with the fragment's driver identity. Returns
/// [`EnrollResult::Complete`] once `stages` fragments were accumulated.
pub fn enroll_stage(
    accumulator: &mut Option<PrintData>,
    stage: &mut u8,
    stages: u8,
    item: PrintItem,
    driver: &str,
    devtype: u32,
) -> ActionResult {
    accumulator
        .get_or_insert_with(|| PrintData::new(driver, devtype))
        .prepend(item);
    *stage = stage.saturating_add(1);

    if *stage >= stages {
        ActionResult::Enroll(EnrollResult::Complete)
    } else {
        ActionResult::Enroll(EnrollResult::Pass)
    }
}

/// Undo the most recent [`enroll_stage`] whose result was never delivered.
///
/// Drops the newest fragment and steps the stage counter back. An
/// accumulator left without fragments is released.
pub fn enroll_rollback(accumulator: &mut Option<PrintData>, stage: &mut u8) {
    if let Some(template) = accumulator.as_mut() {
        template.take_first();
        if template.is_empty() {
            *accumulator = None;
        }
    }
    *stage = stage.saturating_sub(1);
}

/// Classify a similarity score against the match threshold.
///
/// # Examples
///
/// ```
/// use fprint_core::{ActionResult, ScanError, VerifyResult};
/// use fprint_imgdev::policy::classify;
///
/// assert_eq!(classify(40, 40), ActionResult::Verify(VerifyResult::Match));
/// assert_eq!(classify(39, 40), ActionResult::Verify(VerifyResult::NoMatch));
/// assert_eq!(
///     classify(-3, 40),
///     ActionResult::Error(ScanError::Comparison { code: -3 })
/// );
/// ```
pub fn classify(score: i32, threshold: i32) -> ActionResult {
    if score < 0 {
        ActionResult::Error(ScanError::Comparison { code: score })
    } else if score >= threshold {
        ActionResult::Verify(VerifyResult::Match)
    } else {
        ActionResult::Verify(VerifyResult::NoMatch)
    }
}

/// Compare a probe against the reference print of a verification.
pub fn verify(
    engine: &dyn MatchEngine,
    reference: &PrintData,
    probe: &PrintData,
    threshold: i32,
) -> ActionResult {
    let score = engine.compare(reference, probe);
    tracing::debug!(score, threshold, "verify score");
    classify(score, threshold)
}

/// Search a gallery for the probe.
///
/// Returns the result and, on a match, the gallery index of the best entry.
pub fn identify(
    engine: &dyn MatchEngine,
    probe: &PrintData,
    gallery: &[PrintData],
    threshold: i32,
) -> (ActionResult, Option<usize>) {
    let best = engine.compare_gallery(probe, gallery);
    tracing::debug!(score = best.score, index = ?best.index, threshold, "identify score");

    match (classify(best.score, threshold), best.index) {
        (ActionResult::Verify(VerifyResult::Match), Some(index)) => {
            (ActionResult::Verify(VerifyResult::Match), Some(index))
        }
        (ActionResult::Verify(_), _) => (ActionResult::Verify(VerifyResult::NoMatch), None),
        (other, _) => (other, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fprint_biometric::{ERROR_EMPTY_PRINT, Minutia, MinutiaKind, MinutiaeEngine};
    use proptest::prelude::*;
    use rstest::rstest;

    fn print_with(points: &[(u32, u32)]) -> PrintData {
        let minutiae = points
            .iter()
            .map(|&(x, y)| Minutia::new(x, y, 0, MinutiaKind::Ending))
            .collect();
        PrintData::from_item("mock", 0, PrintItem::new(minutiae))
    }

    #[rstest]
    #[case(0, 40, VerifyResult::NoMatch)]
    #[case(39, 40, VerifyResult::NoMatch)]
    #[case(40, 40, VerifyResult::Match)]
    #[case(41, 40, VerifyResult::Match)]
    #[case(0, 1, VerifyResult::NoMatch)]
    fn test_classify_boundaries(
        #[case] score: i32,
        #[case] threshold: i32,
        #[case] expected: VerifyResult,
    ) {
        assert_eq!(classify(score, threshold), ActionResult::Verify(expected));
    }

    proptest! {
        #[test]
        fn prop_negative_scores_are_errors(score in i32::MIN..0, threshold in 0i32..1000) {
            prop_assert_eq!(
                classify(score, threshold),
                ActionResult::Error(ScanError::Comparison { code: score })
            );
        }

        #[test]
        fn prop_match_iff_score_reaches_threshold(score in 0i32..10_000, threshold in 1i32..10_000) {
            let is_match = classify(score, threshold) == ActionResult::Verify(VerifyResult::Match);
            prop_assert_eq!(is_match, score >= threshold);
        }
    }

    #[test]
    fn test_enroll_stages_accumulate() {
        let mut accumulator = None;
        let mut stage = 0;

        for _ in 0..2 {
            let result = enroll_stage(&mut accumulator, &mut stage, 3, PrintItem::default(), "mock", 7);
            assert_eq!(result, ActionResult::Enroll(EnrollResult::Pass));
        }
        let result = enroll_stage(&mut accumulator, &mut stage, 3, PrintItem::default(), "mock", 7);
        assert_eq!(result, ActionResult::Enroll(EnrollResult::Complete));

        let template = accumulator.unwrap();
        assert_eq!(template.len(), 3);
        assert!(template.is_compatible("mock", 7));
        assert_eq!(stage, 3);
    }

    #[test]
    fn test_enroll_rollback_undoes_last_stage() {
        let mut accumulator = None;
        let mut stage = 0;
        for _ in 0..2 {
            enroll_stage(&mut accumulator, &mut stage, 5, PrintItem::default(), "mock", 0);
        }

        enroll_rollback(&mut accumulator, &mut stage);
        assert_eq!(stage, 1);
        assert_eq!(accumulator.as_ref().map(PrintData::len), Some(1));

        enroll_rollback(&mut accumulator, &mut stage);
        assert_eq!(stage, 0);
        assert!(accumulator.is_none());
    }

    #[test]
    fn test_single_stage_enrollment_completes_at_once() {
        let mut accumulator = None;
        let mut stage = 0;
        let result = enroll_stage(&mut accumulator, &mut stage, 1, PrintItem::default(), "mock", 0);
        assert_eq!(result, ActionResult::Enroll(EnrollResult::Complete));
    }

    #[test]
    fn test_verify_uses_engine_score() {
        let engine = MinutiaeEngine::default();
        let reference = print_with(&[(10, 10), (20, 20)]);

        assert_eq!(
            verify(&engine, &reference, &reference, 10),
            ActionResult::Verify(VerifyResult::Match)
        );
        assert_eq!(
            verify(&engine, &reference, &reference, 11),
            ActionResult::Verify(VerifyResult::NoMatch)
        );
        assert_eq!(
            verify(&engine, &PrintData::new("mock", 0), &reference, 10),
            ActionResult::Error(ScanError::Comparison {
                code: ERROR_EMPTY_PRINT
            })
        );
    }

    #[test]
    fn test_identify_reports_best_index() {
        let engine = MinutiaeEngine::default();
        let probe = print_with(&[(10, 10), (20, 20)]);
        let gallery = vec![print_with(&[(50, 50)]), probe.clone()];

        let (result, index) = identify(&engine, &probe, &gallery, 10);
        assert_eq!(result, ActionResult::Verify(VerifyResult::Match));
        assert_eq!(index, Some(1));
    }

    #[test]
    fn test_identify_below_threshold_has_no_index() {
        let engine = MinutiaeEngine::default();
        let probe = print_with(&[(10, 10), (20, 20)]);
        let gallery = vec![probe.clone()];

        let (result, index) = identify(&engine, &probe, &gallery, 11);
        assert_eq!(result, ActionResult::Verify(VerifyResult::NoMatch));
        assert_eq!(index, None);
    }

    #[test]
    fn test_identify_empty_gallery() {
        let engine = MinutiaeEngine::default();
        let probe = print_with(&[(10, 10)]);

        let (result, index) = identify(&engine, &probe, &[], 40);
        assert_eq!(result, ActionResult::Verify(VerifyResult::NoMatch));
        assert_eq!(index, None);
    }
}
