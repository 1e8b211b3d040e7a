use chrono::{DateTime, Utc};
use cogq_srs::{Scheduled, SrsState};
use serde::{Deserialize, Serialize};

/// Multiple-choice question produced by the question generator
///
/// Field names follow the generator's JSON shape (`questionText`, `correctAnswer`).
/// Two questions are the same question when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique question identifier
    pub id: String,
    /// Full question text
    pub question_text: String,
    /// Answer options, four distinct strings in display order
    pub options: Vec<String>,
    /// The correct option, equal to one element of `options`
    pub correct_answer: String,
    /// Short explanation of the correct answer
    pub explanation: String,
    /// One or two keywords naming the concept tested
    pub topic: String,
}

impl Question {
    /// Whether `selected` is the correct option.
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_answer == selected
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Question {}

/// Quiz difficulty, persisted under its display label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Seven minutes by default
    #[serde(rename = "آسان")]
    Easy,
    /// Five minutes by default
    #[default]
    #[serde(rename = "متوسط")]
    Medium,
    /// Four minutes by default
    #[serde(rename = "سخت")]
    Hard,
}

impl Difficulty {
    /// All difficulties in display order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Label shown to the learner and sent to the question generator.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "آسان",
            Self::Medium => "متوسط",
            Self::Hard => "سخت",
        }
    }

    /// Short ASCII name used in logs and metric labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// One recorded answer within a quiz attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    /// Id of the answered question
    pub question_id: String,
    /// Option the learner picked
    pub selected_answer: String,
    /// Whether `selected_answer` matched the correct option
    pub is_correct: bool,
}

impl UserAnswer {
    /// Record `selected` as the answer to `question`, deriving correctness.
    pub fn for_question(question: &Question, selected: impl Into<String>) -> Self {
        let selected_answer = selected.into();
        Self {
            question_id: question.id.clone(),
            is_correct: question.is_correct(&selected_answer),
            selected_answer,
        }
    }
}

/// Outcome of a finished quiz, created once and never modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Percentage of questions answered correctly (0-100)
    pub score: f64,
    /// Recorded answers, at most one per question
    pub answers: Vec<UserAnswer>,
    /// The questions of the attempt, in order
    pub questions: Vec<Question>,
    /// Performance analysis text, or the fallback message
    pub analysis: String,
}

/// Append-only record of a quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryItem {
    /// Chapter title
    pub chapter: String,
    /// Score of the attempt (0-100)
    pub score: f64,
    /// When the attempt finished
    pub date: DateTime<Utc>,
    /// Entries written before difficulty existed decode as medium
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// A previously missed question with its review schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeItem {
    /// The missed question, as first recorded
    pub question: Question,
    /// Review schedule
    pub srs: SrsState,
}

impl PracticeItem {
    /// A freshly missed question, due at `now`.
    pub fn missed(question: Question, now: DateTime<Utc>) -> Self {
        Self {
            question,
            srs: SrsState::failed(now),
        }
    }

    /// Id of the underlying question.
    pub fn id(&self) -> &str {
        &self.question.id
    }
}

impl Scheduled for PracticeItem {
    fn key(&self) -> &str {
        &self.question.id
    }

    fn srs(&self) -> &SrsState {
        &self.srs
    }

    fn srs_mut(&mut self) -> &mut SrsState {
        &mut self.srs
    }
}

/// Stored form of a practice item.
///
/// Older records are plain questions; the scheduling fields are optional so
/// those still decode and can be migrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PracticeRecord {
    #[serde(flatten)]
    pub(crate) question: Question,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) srs_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) next_review_date: Option<DateTime<Utc>>,
}

impl PracticeRecord {
    /// Whether this record predates scheduling metadata.
    pub(crate) const fn is_legacy(&self) -> bool {
        self.srs_level.is_none() || self.next_review_date.is_none()
    }

    /// Convert to a practice item, defaulting missing fields to level 0, due at `now`.
    pub(crate) fn into_item(self, now: DateTime<Utc>) -> PracticeItem {
        PracticeItem {
            srs: SrsState {
                level: self.srs_level.unwrap_or(0),
                next_review: self.next_review_date.unwrap_or(now),
            },
            question: self.question,
        }
    }
}

impl From<&PracticeItem> for PracticeRecord {
    fn from(item: &PracticeItem) -> Self {
        Self {
            question: item.question.clone(),
            srs_level: Some(item.srs.level),
            next_review_date: Some(item.srs.next_review),
        }
    }
}

/// Colour theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background
    #[default]
    Dark,
}

impl Theme {
    /// Stored form of the preference.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored preference. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}
