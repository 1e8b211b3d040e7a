use std::collections::HashSet;

use cogq_store::{Difficulty, Question, UserAnswer};

use crate::error::GenerationError;

/// Result of moving past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    /// The quiz moved on to the question at this index.
    Next(usize),
    /// There are no more questions.
    Finished,
}

/// One run through a fixed list of questions.
///
/// Starts at question 0 with no answers. Each question accepts one answer;
/// later submissions for the same question are ignored. Moving past the last
/// question, or a forced finish, ends the session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    chapter_title: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    index: usize,
    answers: Vec<UserAnswer>,
    finished: bool,
}

impl QuizSession {
    /// Start a session. Fails if there are fewer than `min_questions` questions
    /// (and always for an empty list).
    pub fn new(
        chapter_title: impl Into<String>,
        difficulty: Difficulty,
        questions: Vec<Question>,
        min_questions: usize,
    ) -> Result<Self, GenerationError> {
        if questions.is_empty() || questions.len() < min_questions {
            return Err(GenerationError::Insufficient {
                expected: min_questions.max(1),
                received: questions.len(),
            });
        }

        Ok(Self {
            chapter_title: chapter_title.into(),
            difficulty,
            questions,
            index: 0,
            answers: Vec::new(),
            finished: false,
        })
    }

    pub fn chapter_title(&self) -> &str {
        &self.chapter_title
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    /// Index of the active question.
    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.questions.len()
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// The active question, or `None` once the session has finished.
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.questions.get(self.index)
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&UserAnswer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Record `selected` for the active question.
    ///
    /// Returns the answer now on record for that question: the new one, or
    /// the first one if it had already been answered. Does not move to the
    /// next question. Returns `None` after the session has finished.
    pub fn submit_answer(&mut self, selected: &str) -> Option<&UserAnswer> {
        let question = self.current_question()?;
        let question_id = question.id.clone();

        if self.answer_for(&question_id).is_none() {
            let answer = UserAnswer::for_question(question, selected);
            tracing::debug!(
                question_id = %answer.question_id,
                is_correct = answer.is_correct,
                "Answer recorded"
            );
            self.answers.push(answer);
        }

        self.answer_for(&question_id)
    }

    /// Move past the active question. Unanswered questions count as incorrect.
    pub fn advance(&mut self) -> QuizStep {
        if self.finished {
            return QuizStep::Finished;
        }

        if self.is_last() {
            self.finished = true;
            return QuizStep::Finished;
        }

        self.index += 1;
        QuizStep::Next(self.index)
    }

    /// End the session immediately, e.g. when time runs out.
    pub fn force_finish(&mut self) {
        if !self.finished {
            tracing::debug!(
                answered = self.answers.len(),
                total = self.questions.len(),
                "Quiz finished early"
            );
        }
        self.finished = true;
    }

    /// Number of questions answered correctly.
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.answer_for(&q.id).is_some_and(|a| a.is_correct))
            .count()
    }

    /// Percentage of correct answers, 0-100.
    pub fn score(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        100.0 * self.correct_count() as f64 / self.questions.len() as f64
    }

    /// Questions answered incorrectly or not at all, first occurrence per id.
    pub fn missed_questions(&self) -> Vec<Question> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter(|q| !self.answer_for(&q.id).is_some_and(|a| a.is_correct))
            .filter(|q| seen.insert(q.id.as_str()))
            .cloned()
            .collect()
    }
}
