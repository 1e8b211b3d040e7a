//! Quiz sessions and what happens when one ends.

mod session;

pub use session::{QuizSession, QuizStep};

use chrono::{DateTime, Utc};
use cogq_srs::{Admission, admit_miss};
use cogq_store::{
    PracticeItem, ProgressStore, Question, QuizHistoryItem, QuizResult, StoreError,
};

use crate::error::AnalysisError;
use crate::metrics;
use crate::ports::{ApiCredential, PerformanceAnalyzer};

/// Analysis text used when the analyzer fails.
pub const ANALYSIS_FALLBACK: &str =
    "متاسفانه تحلیل عملکرد شما با خطا مواجه شد. لطفا دوباره تلاش کنید.";

/// Add missed questions to the practice pool.
///
/// Questions already in the pool are re-failed instead of duplicated.
/// Returns `(inserted, refailed)`.
pub fn record_misses(
    store: &ProgressStore,
    missed: &[Question],
    now: DateTime<Utc>,
) -> Result<(usize, usize), StoreError> {
    if missed.is_empty() {
        return Ok((0, 0));
    }

    store.update_practice_pool(now, |pool| {
        let mut inserted = 0;
        let mut refailed = 0;
        for question in missed {
            match admit_miss(pool, PracticeItem::missed(question.clone(), now), now) {
                Admission::Inserted => inserted += 1,
                Admission::Refailed => refailed += 1,
            }
        }
        (inserted, refailed)
    })
}

/// Finish a completed quiz: update the practice pool, append history, and
/// request the performance analysis.
///
/// Never fails. Storage failures are logged and the result is still
/// produced; an analysis failure is replaced by [`ANALYSIS_FALLBACK`].
///
/// The session should be finished; an unfinished one is scored as it stands.
pub async fn complete_quiz(
    session: &QuizSession,
    store: &ProgressStore,
    analyzer: &dyn PerformanceAnalyzer,
    credential: Option<&ApiCredential>,
    now: DateTime<Utc>,
) -> QuizResult {
    if !session.is_finished() {
        tracing::warn!("Completing a quiz that has not finished");
    }

    let score = session.score();
    let missed = session.missed_questions();

    match record_misses(store, &missed, now) {
        Ok((inserted, refailed)) => {
            tracing::debug!(inserted, refailed, "Practice pool updated");
        }
        Err(e) => {
            tracing::error!("Failed to update practice pool: {e}");
        }
    }

    let history_item = QuizHistoryItem {
        chapter: session.chapter_title().to_string(),
        score,
        date: now,
        difficulty: session.difficulty(),
    };
    if let Err(e) = store.append_history(history_item) {
        tracing::error!("Failed to append quiz history: {e}");
    }

    let analysis = match credential {
        Some(credential) => {
            analyzer
                .analyze_performance(
                    credential,
                    session.questions(),
                    session.answers(),
                    session.chapter_title(),
                )
                .await
        }
        None => Err(AnalysisError::MissingCredential),
    };

    let analysis = analysis.unwrap_or_else(|e| {
        tracing::warn!("Performance analysis failed, using fallback: {e}");
        metrics::analysis_fallback();
        ANALYSIS_FALLBACK.to_string()
    });

    metrics::quiz_completed(session.difficulty());
    tracing::info!(
        chapter = session.chapter_title(),
        difficulty = session.difficulty().as_str(),
        score,
        missed = missed.len(),
        "Quiz completed"
    );

    QuizResult {
        score,
        answers: session.answers().to_vec(),
        questions: session.questions().to_vec(),
        analysis,
    }
}
