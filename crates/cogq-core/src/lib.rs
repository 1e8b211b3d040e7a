//! Quiz core for a cognitive-psychology study tool.
//!
//! Generates chapter quizzes through a pluggable text service, times and
//! scores them, feeds missed questions into a spaced-repetition practice
//! pool and keeps learner progress in a [`KeyValueStore`](cogq_store::KeyValueStore).

pub mod catalog;
pub mod config;
pub mod countdown;
pub mod error;
mod metrics;
pub mod ports;
pub mod practice;
pub mod quiz;
pub mod state;
pub mod stats;
pub mod tracing;
pub mod validation;

pub use catalog::{CHAPTERS, Chapter};
pub use config::StudyConfig;
pub use error::{AnalysisError, AppError, GenerationError};
pub use ports::{ApiCredential, PerformanceAnalyzer, QuestionGenerator};
pub use state::{AppContext, Phase, StudyApp};
