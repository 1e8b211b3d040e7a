//! Persistence for the quiz application: data model, key-value port and the
//! typed stores built on it.

pub mod kv;
pub mod models;
pub mod progress;
pub mod settings;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use models::{
    Difficulty, PracticeItem, Question, QuizHistoryItem, QuizResult, Theme, UserAnswer,
};
pub use progress::ProgressStore;
pub use settings::SettingsStore;
