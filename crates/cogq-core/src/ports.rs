//! Contracts for the generative text service.
//!
//! The quiz core never talks to the network itself; hosts plug in adapters
//! implementing these traits.

use std::fmt;

use async_trait::async_trait;
use cogq_store::{Difficulty, Question, UserAnswer};

use crate::error::{AnalysisError, GenerationError};

/// API credential for the text service. `Debug` does not print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wrap a credential, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Produce `count` multiple-choice questions for a chapter.
    async fn generate_questions(
        &self,
        credential: &ApiCredential,
        chapter_title: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError>;
}

#[async_trait]
pub trait PerformanceAnalyzer: Send + Sync {
    /// Write a markdown analysis of a finished quiz.
    async fn analyze_performance(
        &self,
        credential: &ApiCredential,
        questions: &[Question],
        answers: &[UserAnswer],
        chapter_title: &str,
    ) -> Result<String, AnalysisError>;
}
