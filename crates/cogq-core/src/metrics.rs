//! Counters for quiz and practice activity.
//!
//! No recorder is installed here; without one these calls are no-ops.

use cogq_store::Difficulty;
use metrics::counter;

use crate::practice::ReviewMode;

pub(crate) fn quiz_completed(difficulty: Difficulty) {
    counter!("quizzes_completed_total", "difficulty" => difficulty.as_str()).increment(1);
}

pub(crate) fn generation_failed(reason: &'static str) {
    counter!("quiz_generation_failures_total", "reason" => reason).increment(1);
}

pub(crate) fn analysis_fallback() {
    counter!("analysis_fallbacks_total").increment(1);
}

pub(crate) fn practice_review(mode: ReviewMode, is_correct: bool) {
    let outcome = if is_correct { "correct" } else { "incorrect" };
    counter!(
        "practice_reviews_total",
        "mode" => mode.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
