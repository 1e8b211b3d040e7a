//! Aggregates over quiz history for the progress screen.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cogq_store::{Difficulty, QuizHistoryItem};
use serde::Serialize;

use crate::catalog::CHAPTERS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterAverage {
    pub chapter_id: u32,
    pub title: &'static str,
    /// Mean score, rounded
    pub average: u32,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifficultyAverage {
    pub difficulty: Difficulty,
    pub average: u32,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    /// 1-based attempt number
    pub ordinal: usize,
    pub score: u32,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub attempts: usize,
    pub chapters: Vec<ChapterAverage>,
    pub difficulties: Vec<DifficultyAverage>,
    pub timeline: Vec<TimelinePoint>,
}

impl ProgressReport {
    pub fn from_history(history: &[QuizHistoryItem]) -> Self {
        Self {
            attempts: history.len(),
            chapters: chapter_averages(history),
            difficulties: difficulty_averages(history),
            timeline: timeline(history),
        }
    }
}

#[derive(Default)]
struct Tally {
    total: f64,
    count: usize,
}

impl Tally {
    fn add(&mut self, score: f64) {
        self.total += score;
        self.count += 1;
    }

    fn rounded_mean(&self) -> u32 {
        if self.count == 0 {
            return 0;
        }
        round_score(self.total / self.count as f64)
    }
}

fn round_score(score: f64) -> u32 {
    score.round().clamp(0.0, 100.0) as u32
}

/// Mean score per catalog chapter, in catalog order.
///
/// Chapters without attempts, or whose mean rounds to 0, are left out.
/// History entries for titles outside the catalog are ignored.
pub fn chapter_averages(history: &[QuizHistoryItem]) -> Vec<ChapterAverage> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for item in history {
        tallies.entry(item.chapter.as_str()).or_default().add(item.score);
    }

    CHAPTERS
        .iter()
        .filter_map(|chapter| {
            let tally = tallies.get(chapter.title)?;
            let average = tally.rounded_mean();
            (average > 0).then_some(ChapterAverage {
                chapter_id: chapter.id,
                title: chapter.title,
                average,
                attempts: tally.count,
            })
        })
        .collect()
}

/// Mean score per difficulty that has at least one attempt, easiest first.
pub fn difficulty_averages(history: &[QuizHistoryItem]) -> Vec<DifficultyAverage> {
    let mut tallies: HashMap<Difficulty, Tally> = HashMap::new();
    for item in history {
        tallies.entry(item.difficulty).or_default().add(item.score);
    }

    Difficulty::ALL
        .iter()
        .filter_map(|difficulty| {
            let tally = tallies.get(difficulty)?;
            Some(DifficultyAverage {
                difficulty: *difficulty,
                average: tally.rounded_mean(),
                attempts: tally.count,
            })
        })
        .collect()
}

/// Every attempt in recorded order with its rounded score.
pub fn timeline(history: &[QuizHistoryItem]) -> Vec<TimelinePoint> {
    history
        .iter()
        .enumerate()
        .map(|(i, item)| TimelinePoint {
            ordinal: i + 1,
            score: round_score(item.score),
            date: item.date,
        })
        .collect()
}
