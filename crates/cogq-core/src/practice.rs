//! Review sessions over the practice pool or the bookmarks.
//!
//! The list of questions is fixed when the session starts. Each answer takes
//! effect in storage right away; there is no summary at the end.

use chrono::{DateTime, Utc};
use cogq_srs::{IntervalTable, Scheduled, due_items, review_outcome};
use cogq_store::{PracticeItem, ProgressStore, Question, StoreError};

use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// Due items from the practice pool; answers reschedule them.
    Practice,
    /// All bookmarks; a correct answer removes the bookmark.
    Bookmarks,
}

impl ReviewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Bookmarks => "bookmarks",
        }
    }
}

/// What happened to an answered review question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeFeedback {
    pub question_id: String,
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    /// New SRS level, when the item was rescheduled
    pub new_level: Option<u32>,
    /// When the item is due next, when it was rescheduled
    pub next_review: Option<DateTime<Utc>>,
    /// Whether the question left its pool
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    mode: ReviewMode,
    questions: Vec<Question>,
    index: usize,
    correct: usize,
}

impl PracticeSession {
    /// Snapshot the items of `pool` that are due at `now`.
    pub fn due(pool: &[PracticeItem], now: DateTime<Utc>) -> Self {
        let questions = due_items(pool, now)
            .into_iter()
            .map(|item| item.question)
            .collect();
        Self::new(ReviewMode::Practice, questions)
    }

    /// Snapshot every bookmark.
    pub fn bookmarks(bookmarks: Vec<Question>) -> Self {
        Self::new(ReviewMode::Bookmarks, bookmarks)
    }

    fn new(mode: ReviewMode, questions: Vec<Question>) -> Self {
        tracing::debug!(mode = mode.as_str(), count = questions.len(), "Review session started");
        Self {
            mode,
            questions,
            index: 0,
            correct: 0,
        }
    }

    pub const fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// A session that started with nothing to review.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Zero-based position of the active question.
    pub const fn position(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.index)
    }

    pub const fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Answer the active question, apply its effect to storage, and move on.
    ///
    /// Returns `Ok(None)` once the session has finished. On a storage error
    /// the session stays on the same question.
    pub fn answer(
        &mut self,
        selected: &str,
        store: &ProgressStore,
        table: &IntervalTable,
        now: DateTime<Utc>,
    ) -> Result<Option<PracticeFeedback>, StoreError> {
        let Some(question) = self.current_question() else {
            return Ok(None);
        };

        let is_correct = question.is_correct(selected);
        let mut feedback = PracticeFeedback {
            question_id: question.id.clone(),
            is_correct,
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation.clone(),
            new_level: None,
            next_review: None,
            removed: false,
        };

        match self.mode {
            ReviewMode::Practice => {
                let rescheduled = store.update_practice_pool(now, |pool| {
                    let item = pool.iter_mut().find(|item| item.id() == feedback.question_id)?;
                    let next = review_outcome(*item.srs(), is_correct, now, table);
                    *item.srs_mut() = next;
                    Some(next)
                })?;

                match rescheduled {
                    Some(next) => {
                        feedback.new_level = Some(next.level);
                        feedback.next_review = Some(next.next_review);
                    }
                    None => {
                        tracing::debug!(
                            question_id = %feedback.question_id,
                            "Question left the practice pool during the session"
                        );
                    }
                }
            }
            ReviewMode::Bookmarks => {
                if is_correct {
                    feedback.removed = store.remove_bookmark(&feedback.question_id)?;
                }
            }
        }

        metrics::practice_review(self.mode, is_correct);
        tracing::debug!(
            mode = self.mode.as_str(),
            question_id = %feedback.question_id,
            is_correct,
            level = ?feedback.new_level,
            "Review applied"
        );

        if is_correct {
            self.correct += 1;
        }
        self.index += 1;

        Ok(Some(feedback))
    }
}
