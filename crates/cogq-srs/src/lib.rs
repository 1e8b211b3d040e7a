//! SRS (Spaced Repetition System) library for the cognitive psychology quiz
//!
//! This crate provides the scheduling rules for questions a learner has missed:
//! how a practice item's level and next review date move after each answer,
//! how a fresh miss enters the practice pool, and which items are due.
//!
//! Nothing here touches storage or the clock. Callers pass `now` in and get
//! new values back.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Default review intervals in days, indexed by `level - 1`.
pub const DEFAULT_INTERVAL_DAYS: [u32; 5] = [1, 3, 7, 14, 30];

/// Errors raised when building an [`IntervalTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalTableError {
    /// The table has no entries.
    #[error("interval table must contain at least one interval")]
    Empty,
    /// An entry is zero or negative.
    #[error("interval at position {0} must be longer than zero")]
    NonPositive(usize),
    /// An entry is shorter than the one before it.
    #[error("interval at position {0} is shorter than the previous one")]
    NotAscending(usize),
}

/// Ordered review intervals. Entry `n` is used when an item reaches level `n + 1`.
///
/// Always non-empty, every entry strictly positive and none shorter than
/// the one before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    intervals: Vec<Duration>,
}

impl IntervalTable {
    /// Build a table from arbitrary durations.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalTableError::Empty`] for an empty list and
    /// [`IntervalTableError::NonPositive`] for any entry that is not longer than zero,
    /// and [`IntervalTableError::NotAscending`] for any entry shorter than its predecessor.
    pub fn new(intervals: Vec<Duration>) -> Result<Self, IntervalTableError> {
        if intervals.is_empty() {
            return Err(IntervalTableError::Empty);
        }

        if let Some(position) = intervals.iter().position(|d| *d <= Duration::zero()) {
            return Err(IntervalTableError::NonPositive(position));
        }

        if let Some(position) = intervals.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(IntervalTableError::NotAscending(position + 1));
        }

        Ok(Self { intervals })
    }

    /// Build a table from whole day counts.
    ///
    /// # Examples
    /// ```
    /// use cogq_srs::IntervalTable;
    ///
    /// assert!(IntervalTable::from_days(&[1, 3, 7]).is_ok());
    /// assert!(IntervalTable::from_days(&[]).is_err());
    /// ```
    pub fn from_days(days: &[u32]) -> Result<Self, IntervalTableError> {
        Self::new(days.iter().map(|d| Duration::days(i64::from(*d))).collect())
    }

    /// Get the interval for an item that has just reached `level`.
    ///
    /// Levels past the end of the table clamp to the longest configured interval.
    /// Level 0 is treated like level 1.
    pub fn interval_for_level(&self, level: u32) -> Duration {
        let index = (level.saturating_sub(1) as usize).min(self.intervals.len() - 1);
        self.intervals[index]
    }

    /// Number of configured intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Always `false` for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self {
            intervals: DEFAULT_INTERVAL_DAYS
                .iter()
                .map(|d| Duration::days(i64::from(*d)))
                .collect(),
        }
    }
}

/// Scheduling metadata carried by every practice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrsState {
    /// Consecutive correct reviews since the last miss.
    pub level: u32,
    /// When the item becomes due again.
    pub next_review: DateTime<Utc>,
}

impl SrsState {
    /// State of an item that has just been missed: level 0, due immediately.
    pub const fn failed(now: DateTime<Utc>) -> Self {
        Self {
            level: 0,
            next_review: now,
        }
    }

    /// Whether the item should be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Anything the scheduler can manage inside a pool.
///
/// The key identifies the item within a pool; two items with the same key
/// are the same item.
pub trait Scheduled {
    /// Identity of the item within a pool.
    fn key(&self) -> &str;
    /// Current scheduling state.
    fn srs(&self) -> &SrsState;
    /// Mutable access to the scheduling state.
    fn srs_mut(&mut self) -> &mut SrsState;
}

/// Compute the scheduling state after a review.
///
/// # Arguments
///
/// * `state` - The item's state before the answer
/// * `is_correct` - Whether the learner answered correctly
/// * `now` - The moment the answer was given
/// * `table` - Review intervals
///
/// # Returns
///
/// The new state.
///
/// # Algorithm
///
/// * Correct: level goes up by one, next review is `now` plus the interval
///   for the new level (clamped to the last table entry).
/// * Incorrect: level resets to 0, the item is due again at `now`.
pub fn review_outcome(
    state: SrsState,
    is_correct: bool,
    now: DateTime<Utc>,
    table: &IntervalTable,
) -> SrsState {
    if !is_correct {
        return SrsState::failed(now);
    }

    let level = state.level.saturating_add(1);
    let interval = table.interval_for_level(level);

    SrsState {
        level,
        next_review: now
            .checked_add_signed(interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

/// Apply [`review_outcome`] to an item and hand it back.
pub fn review_item<T: Scheduled>(
    mut item: T,
    is_correct: bool,
    now: DateTime<Utc>,
    table: &IntervalTable,
) -> T {
    let next = review_outcome(*item.srs(), is_correct, now, table);
    *item.srs_mut() = next;
    item
}

/// What [`admit_miss`] did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The item was not in the pool and has been added.
    Inserted,
    /// The item was already present; its schedule was reset, its content kept.
    Refailed,
}

/// Record a missed question in the practice pool.
///
/// If an item with the same key is already present, its state is reset as if
/// it had just failed a review and the stored content is kept. Otherwise
/// `candidate` is appended with a failed state.
pub fn admit_miss<T: Scheduled>(pool: &mut Vec<T>, candidate: T, now: DateTime<Utc>) -> Admission {
    if let Some(existing) = pool.iter_mut().find(|item| item.key() == candidate.key()) {
        *existing.srs_mut() = SrsState::failed(now);
        return Admission::Refailed;
    }

    let mut candidate = candidate;
    *candidate.srs_mut() = SrsState::failed(now);
    pool.push(candidate);
    Admission::Inserted
}

/// Items due for review at `now`, in pool order.
pub fn due_items<T: Scheduled + Clone>(pool: &[T], now: DateTime<Utc>) -> Vec<T> {
    pool.iter()
        .filter(|item| item.srs().is_due(now))
        .cloned()
        .collect()
}
