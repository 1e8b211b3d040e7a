use std::sync::Arc;

use chrono::Utc;
use cogq_srs::IntervalTable;
use cogq_store::{
    Difficulty, KeyValueStore, ProgressStore, Question, QuizResult, SettingsStore, Theme,
};

use crate::catalog::Chapter;
use crate::config::StudyConfig;
use crate::countdown::Countdown;
use crate::error::{AppError, GenerationError};
use crate::metrics;
use crate::ports::{ApiCredential, PerformanceAnalyzer, QuestionGenerator};
use crate::practice::{PracticeFeedback, PracticeSession};
use crate::quiz::{QuizSession, QuizStep, complete_quiz};
use crate::stats::ProgressReport;
use crate::validation::validate_batch;

/// Settings the core reads but never changes on its own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppContext {
    pub credential: Option<ApiCredential>,
    pub theme: Theme,
}

impl AppContext {
    pub fn load(settings: &SettingsStore) -> Result<Self, AppError> {
        Ok(Self {
            credential: settings.load_credential()?.and_then(ApiCredential::new),
            theme: settings.load_theme()?.unwrap_or_default(),
        })
    }
}

/// Where the application currently is
#[derive(Debug)]
pub enum Phase {
    Startup,
    CredentialSetup,
    Home,
    LoadingQuiz,
    Quiz(QuizSession),
    LoadingAnalysis,
    Results(QuizResult),
    Practice(PracticeSession),
    Stats,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Startup => "starting up",
            Self::CredentialSetup => "entering a credential",
            Self::Home => "at home",
            Self::LoadingQuiz => "loading a quiz",
            Self::Quiz(_) => "taking a quiz",
            Self::LoadingAnalysis => "analysing a quiz",
            Self::Results(_) => "viewing results",
            Self::Practice(_) => "practising",
            Self::Stats => "viewing statistics",
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingQuiz | Self::LoadingAnalysis)
    }
}

/// Counts shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeSummary {
    pub practice_items: usize,
    pub due_items: usize,
    pub bookmarks: usize,
}

/// The quiz application
///
/// Owns the context, the stores, the text-service ports and the current
/// phase. All operations run to completion before the next one starts.
pub struct StudyApp {
    config: StudyConfig,
    intervals: IntervalTable,
    context: AppContext,
    progress: ProgressStore,
    settings: SettingsStore,
    generator: Arc<dyn QuestionGenerator>,
    analyzer: Arc<dyn PerformanceAnalyzer>,
    phase: Phase,
    countdown: Option<Countdown>,
    selection: Option<(Chapter, Difficulty)>,
    last_error: Option<String>,
}

impl std::fmt::Debug for StudyApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudyApp")
            .field("context", &self.context)
            .field("phase", &self.phase)
            .field("selection", &self.selection)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl StudyApp {
    pub fn new(
        config: StudyConfig,
        kv: Arc<dyn KeyValueStore>,
        generator: Arc<dyn QuestionGenerator>,
        analyzer: Arc<dyn PerformanceAnalyzer>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let intervals = config.interval_table()?;
        let settings = SettingsStore::new(kv.clone());
        let context = AppContext::load(&settings)?;

        tracing::info!(
            has_credential = context.credential.is_some(),
            theme = context.theme.as_str(),
            "Study app initialized"
        );

        Ok(Self {
            config,
            intervals,
            context,
            progress: ProgressStore::new(kv),
            settings,
            generator,
            analyzer,
            phase: Phase::Startup,
            countdown: None,
            selection: None,
            last_error: None,
        })
    }

    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    pub const fn context(&self) -> &AppContext {
        &self.context
    }

    pub const fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub const fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Message for the last failed operation, cleared on navigation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        match &self.phase {
            Phase::Quiz(session) => Some(session),
            _ => None,
        }
    }

    pub fn practice(&self) -> Option<&PracticeSession> {
        match &self.phase {
            Phase::Practice(session) => Some(session),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            Phase::Results(result) => Some(result),
            _ => None,
        }
    }

    /// The running quiz countdown, if any.
    pub fn countdown_mut(&mut self) -> Option<&mut Countdown> {
        self.countdown.as_mut()
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.phase.is_loading() {
            return Err(AppError::Busy);
        }
        Ok(())
    }

    fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    // --- Navigation ---

    /// Leave the startup phase.
    pub fn finish_startup(&mut self) {
        self.phase = if self.context.credential.is_some() {
            Phase::Home
        } else {
            Phase::CredentialSetup
        };
    }

    pub fn go_home(&mut self) {
        self.stop_countdown();
        self.phase = Phase::Home;
        self.selection = None;
        self.last_error = None;
    }

    pub fn edit_credential(&mut self) {
        self.stop_countdown();
        self.last_error = None;
        self.phase = Phase::CredentialSetup;
    }

    pub fn home_summary(&self) -> Result<HomeSummary, AppError> {
        let now = Utc::now();
        let pool = self.progress.load_practice_pool(now)?;
        Ok(HomeSummary {
            practice_items: pool.len(),
            due_items: pool.iter().filter(|item| item.srs.is_due(now)).count(),
            bookmarks: self.progress.load_bookmarks()?.len(),
        })
    }

    pub fn show_stats(&mut self) -> Result<ProgressReport, AppError> {
        self.ensure_idle()?;
        let report = ProgressReport::from_history(&self.progress.load_history()?);
        self.stop_countdown();
        self.phase = Phase::Stats;
        Ok(report)
    }

    // --- Context ---

    pub fn save_credential(&mut self, value: &str) -> Result<(), AppError> {
        let Some(credential) = ApiCredential::new(value) else {
            return Err(GenerationError::MissingCredential.into());
        };
        self.settings.save_credential(credential.expose())?;
        self.context.credential = Some(credential);
        self.last_error = None;
        self.phase = Phase::Home;
        tracing::info!("Credential saved");
        Ok(())
    }

    pub fn clear_credential(&mut self) -> Result<(), AppError> {
        self.settings.clear_credential()?;
        self.context.credential = None;
        self.phase = Phase::CredentialSetup;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        let theme = self.context.theme.toggled();
        self.settings.save_theme(theme)?;
        self.context.theme = theme;
        Ok(theme)
    }

    // --- Quiz ---

    /// Generate questions and start a timed quiz.
    ///
    /// On failure the app returns to credential entry (credential problems)
    /// or home (anything else) and the message is kept in [`last_error`](Self::last_error).
    pub async fn start_quiz(
        &mut self,
        chapter: Chapter,
        difficulty: Difficulty,
    ) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.stop_countdown();
        self.selection = Some((chapter, difficulty));
        self.last_error = None;

        let Some(credential) = self.context.credential.clone() else {
            return Err(self.fail_generation(GenerationError::MissingCredential));
        };

        self.phase = Phase::LoadingQuiz;
        tracing::info!(
            chapter = chapter.title,
            difficulty = difficulty.as_str(),
            "Generating quiz"
        );

        let count = self.config.question_count;
        let session = self
            .generator
            .generate_questions(&credential, chapter.title, difficulty, count)
            .await
            .and_then(|questions| validate_batch(questions, count))
            .and_then(|questions| QuizSession::new(chapter.title, difficulty, questions, count));

        match session {
            Ok(session) => {
                let duration = self.config.quiz_duration(difficulty);
                self.countdown = Some(Countdown::start(duration));
                tracing::info!(
                    questions = session.len(),
                    duration_secs = duration.as_secs(),
                    "Quiz started"
                );
                self.phase = Phase::Quiz(session);
                Ok(())
            }
            Err(e) => Err(self.fail_generation(e)),
        }
    }

    fn fail_generation(&mut self, error: GenerationError) -> AppError {
        tracing::warn!("Quiz generation failed: {error}");
        metrics::generation_failed(error.reason());
        self.last_error = Some(error.user_message());
        self.phase = if error.requires_credential() {
            Phase::CredentialSetup
        } else {
            Phase::Home
        };
        error.into()
    }

    /// Start again with the last chapter and difficulty.
    pub async fn retry_quiz(&mut self) -> Result<(), AppError> {
        let Some((chapter, difficulty)) = self.selection else {
            return Err(AppError::InvalidPhase(self.phase.name()));
        };
        self.start_quiz(chapter, difficulty).await
    }

    /// Answer the active quiz question. See [`QuizSession::submit_answer`].
    pub fn submit_answer(&mut self, selected: &str) -> Result<bool, AppError> {
        match &mut self.phase {
            Phase::Quiz(session) => Ok(session
                .submit_answer(selected)
                .is_some_and(|answer| answer.is_correct)),
            other => Err(AppError::InvalidPhase(other.name())),
        }
    }

    /// Move to the next question, finishing the quiz after the last one.
    pub async fn advance_quiz(&mut self) -> Result<QuizStep, AppError> {
        let step = match &mut self.phase {
            Phase::Quiz(session) => session.advance(),
            other => return Err(AppError::InvalidPhase(other.name())),
        };

        if step == QuizStep::Finished {
            self.finish_quiz().await;
        }
        Ok(step)
    }

    /// Handle the countdown running out.
    ///
    /// Returns `false` if no quiz is running, e.g. a late expiry after the
    /// quiz already finished.
    pub async fn expire_quiz(&mut self) -> bool {
        match &mut self.phase {
            Phase::Quiz(session) => session.force_finish(),
            _ => {
                tracing::debug!("Ignoring countdown expiry outside a quiz");
                return false;
            }
        }

        self.finish_quiz().await;
        true
    }

    async fn finish_quiz(&mut self) {
        self.stop_countdown();

        let session = match std::mem::replace(&mut self.phase, Phase::LoadingAnalysis) {
            Phase::Quiz(session) => session,
            other => {
                self.phase = other;
                return;
            }
        };

        let result = complete_quiz(
            &session,
            &self.progress,
            self.analyzer.as_ref(),
            self.context.credential.as_ref(),
            Utc::now(),
        )
        .await;

        self.phase = Phase::Results(result);
    }

    // --- Review ---

    /// Start reviewing due practice items.
    ///
    /// An empty pool is refused. A pool with nothing due yet starts a session
    /// that is already finished.
    pub fn start_practice(&mut self) -> Result<usize, AppError> {
        self.ensure_idle()?;
        let now = Utc::now();
        let pool = self.progress.load_practice_pool(now)?;
        if pool.is_empty() {
            return Err(AppError::NothingToReview);
        }

        let session = PracticeSession::due(&pool, now);
        let due = session.len();
        tracing::info!(pool = pool.len(), due, "Practice started");
        self.enter_practice(session);
        Ok(due)
    }

    /// Start reviewing every bookmark.
    pub fn start_bookmark_review(&mut self) -> Result<usize, AppError> {
        self.ensure_idle()?;
        let bookmarks = self.progress.load_bookmarks()?;
        if bookmarks.is_empty() {
            return Err(AppError::NothingToReview);
        }

        let session = PracticeSession::bookmarks(bookmarks);
        let count = session.len();
        tracing::info!(count, "Bookmark review started");
        self.enter_practice(session);
        Ok(count)
    }

    fn enter_practice(&mut self, session: PracticeSession) {
        self.stop_countdown();
        self.last_error = None;
        self.phase = Phase::Practice(session);
    }

    /// Answer the active review question.
    pub fn answer_practice(&mut self, selected: &str) -> Result<PracticeFeedback, AppError> {
        match &mut self.phase {
            Phase::Practice(session) => session
                .answer(selected, &self.progress, &self.intervals, Utc::now())?
                .ok_or(AppError::NothingToReview),
            other => Err(AppError::InvalidPhase(other.name())),
        }
    }

    // --- Pool editing ---

    /// Returns `true` when the question is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, question: &Question) -> Result<bool, AppError> {
        Ok(self.progress.toggle_bookmark(question)?)
    }

    pub fn remove_from_practice(&mut self, question_id: &str) -> Result<bool, AppError> {
        Ok(self.progress.remove_from_practice(question_id, Utc::now())?)
    }

    pub fn remove_from_bookmarks(&mut self, question_id: &str) -> Result<bool, AppError> {
        Ok(self.progress.remove_bookmark(question_id)?)
    }

    /// Erase history, practice pool and bookmarks, then go home.
    pub fn reset_progress(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.progress.reset_all()?;
        self.go_home();
        Ok(())
    }
}
