//! Typed access to quiz history, the practice pool and bookmarks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::kv::{KeyValueStore, Result};
use crate::models::{PracticeItem, PracticeRecord, Question, QuizHistoryItem};

pub const HISTORY_KEY: &str = "quizHistory";
pub const PRACTICE_POOL_KEY: &str = "practiceQuestions";
pub const BOOKMARKS_KEY: &str = "bookmarkedQuestions";

/// Read a JSON list stored under `key`.
///
/// A missing key and a value that does not parse both yield an empty list;
/// only backend failures are errors.
fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            tracing::warn!(key, "Stored data is not valid JSON, treating as empty: {e}");
            Ok(Vec::new())
        }
    }
}

fn save_list<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    store.set(key, &raw)
}

/// Progress store over a key-value backend
///
/// Each collection lives under its own key. Writes replace the whole list.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    // --- Quiz history ---

    pub fn load_history(&self) -> Result<Vec<QuizHistoryItem>> {
        load_list(self.kv.as_ref(), HISTORY_KEY)
    }

    pub fn append_history(&self, item: QuizHistoryItem) -> Result<()> {
        let mut history = self.load_history()?;
        history.push(item);
        save_list(self.kv.as_ref(), HISTORY_KEY, &history)
    }

    // --- Practice pool ---

    /// Load the practice pool.
    ///
    /// Records written before scheduling existed are migrated to level 0, due
    /// at `now`, and the migrated pool is written back.
    pub fn load_practice_pool(&self, now: DateTime<Utc>) -> Result<Vec<PracticeItem>> {
        let records: Vec<PracticeRecord> = load_list(self.kv.as_ref(), PRACTICE_POOL_KEY)?;
        let legacy = records.iter().filter(|r| r.is_legacy()).count();

        let mut pool: Vec<PracticeItem> = Vec::with_capacity(records.len());
        for record in records {
            let item = record.into_item(now);
            if pool.iter().any(|existing| existing.id() == item.id()) {
                tracing::warn!(id = item.id(), "Dropping duplicate practice record");
                continue;
            }
            pool.push(item);
        }

        if legacy > 0 {
            tracing::info!(legacy, "Migrated practice records without scheduling data");
            self.save_practice_pool(&pool)?;
        }

        Ok(pool)
    }

    pub fn save_practice_pool(&self, pool: &[PracticeItem]) -> Result<()> {
        let records: Vec<PracticeRecord> = pool.iter().map(PracticeRecord::from).collect();
        save_list(self.kv.as_ref(), PRACTICE_POOL_KEY, &records)
    }

    /// Load the pool, let `f` change it, and save it back.
    pub fn update_practice_pool<F, R>(&self, now: DateTime<Utc>, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<PracticeItem>) -> R,
    {
        let mut pool = self.load_practice_pool(now)?;
        let out = f(&mut pool);
        self.save_practice_pool(&pool)?;
        Ok(out)
    }

    /// Drop a question from the practice pool. Returns whether it was present.
    pub fn remove_from_practice(&self, question_id: &str, now: DateTime<Utc>) -> Result<bool> {
        self.update_practice_pool(now, |pool| {
            let before = pool.len();
            pool.retain(|item| item.id() != question_id);
            pool.len() != before
        })
    }

    // --- Bookmarks ---

    pub fn load_bookmarks(&self) -> Result<Vec<Question>> {
        load_list(self.kv.as_ref(), BOOKMARKS_KEY)
    }

    pub fn save_bookmarks(&self, bookmarks: &[Question]) -> Result<()> {
        save_list(self.kv.as_ref(), BOOKMARKS_KEY, bookmarks)
    }

    /// Add the question if absent, remove it if present.
    ///
    /// Returns `true` when the question is bookmarked afterwards.
    pub fn toggle_bookmark(&self, question: &Question) -> Result<bool> {
        let mut bookmarks = self.load_bookmarks()?;
        let bookmarked = if bookmarks.contains(question) {
            bookmarks.retain(|b| b != question);
            false
        } else {
            bookmarks.push(question.clone());
            true
        };
        self.save_bookmarks(&bookmarks)?;
        Ok(bookmarked)
    }

    /// Returns whether the question was bookmarked.
    pub fn remove_bookmark(&self, question_id: &str) -> Result<bool> {
        let mut bookmarks = self.load_bookmarks()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != question_id);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.save_bookmarks(&bookmarks)?;
        Ok(true)
    }

    // --- Reset ---

    /// Clear history, practice pool and bookmarks.
    ///
    /// Keys are removed one after another; a failure stops the sequence and
    /// earlier removals stay in effect.
    pub fn reset_all(&self) -> Result<()> {
        for key in [HISTORY_KEY, PRACTICE_POOL_KEY, BOOKMARKS_KEY] {
            self.kv.remove(key)?;
        }
        tracing::info!("Progress reset");
        Ok(())
    }
}
