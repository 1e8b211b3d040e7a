use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use cogq_core::{
    AnalysisError, ApiCredential, GenerationError, PerformanceAnalyzer, QuestionGenerator,
    StudyApp, StudyConfig,
};
use cogq_store::settings::CREDENTIAL_KEY;
use cogq_store::{Difficulty, KeyValueStore, MemoryStore, Question, UserAnswer};

pub const TEST_CREDENTIAL: &str = "test-api-key";
pub const ANALYSIS_TEXT: &str = "## Analysis\nGood work on memory models.";

/// Build a four-option question whose correct answer is `"a"`
pub fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        question_text: format!("Question {id}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: "a".to_string(),
        explanation: format!("Explanation for {id}"),
        topic: "memory".to_string(),
    }
}

/// Questions `{prefix}1..={prefix}n`
pub fn questions(prefix: &str, n: usize) -> Vec<Question> {
    (1..=n).map(|i| question(&format!("{prefix}{i}"))).collect()
}

/// Generator that plays back scripted responses, then falls back to fresh
/// batches of the requested size
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Vec<Question>, GenerationError>>>,
    calls: AtomicUsize,
    hang: AtomicBool,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<Vec<Question>, GenerationError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following request wait forever
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate_questions(
        &self,
        _credential: &ApiCredential,
        _chapter_title: &str,
        _difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Question>, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }
        Ok(questions(&format!("gen{call}-"), count))
    }
}

/// Analyzer that either succeeds with [`ANALYSIS_TEXT`] or always fails
pub struct FakeAnalyzer {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerformanceAnalyzer for FakeAnalyzer {
    async fn analyze_performance(
        &self,
        _credential: &ApiCredential,
        questions: &[Question],
        answers: &[UserAnswer],
        _chapter_title: &str,
    ) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(answers.len() <= questions.len());
        if self.fail {
            return Err(AnalysisError::Service("upstream timeout".to_string()));
        }
        Ok(ANALYSIS_TEXT.to_string())
    }
}

/// Everything a test needs to drive and inspect a [`StudyApp`]
pub struct TestApp {
    pub app: StudyApp,
    pub kv: Arc<MemoryStore>,
    pub generator: Arc<ScriptedGenerator>,
    pub analyzer: Arc<FakeAnalyzer>,
}

/// Test app builder over an in-memory store
pub struct TestAppBuilder {
    config: StudyConfig,
    credential: Option<&'static str>,
    analyzer: FakeAnalyzer,
    kv: Arc<MemoryStore>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            config: StudyConfig::default(),
            credential: Some(TEST_CREDENTIAL),
            analyzer: FakeAnalyzer::ok(),
            kv: Arc::new(MemoryStore::new()),
        }
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = None;
        self
    }

    pub fn with_failing_analyzer(mut self) -> Self {
        self.analyzer = FakeAnalyzer::failing();
        self
    }

    pub fn with_store(mut self, kv: Arc<MemoryStore>) -> Self {
        self.kv = kv;
        self
    }

    pub fn with_config(mut self, config: StudyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> anyhow::Result<TestApp> {
        if let Some(credential) = self.credential {
            self.kv.set(CREDENTIAL_KEY, credential)?;
        }

        let generator = Arc::new(ScriptedGenerator::new());
        let analyzer = Arc::new(self.analyzer);

        let mut app = StudyApp::new(
            self.config,
            self.kv.clone(),
            generator.clone(),
            analyzer.clone(),
        )?;
        app.finish_startup();

        Ok(TestApp {
            app,
            kv: self.kv,
            generator,
            analyzer,
        })
    }
}

/// Answer every question of the running quiz, the first `correct` of them
/// correctly, advancing through to the results.
pub async fn play_quiz(app: &mut StudyApp, correct: usize) -> anyhow::Result<()> {
    let total = app.quiz().map(|q| q.len()).unwrap_or_default();
    for i in 0..total {
        app.submit_answer(if i < correct { "a" } else { "b" })?;
        app.advance_quiz().await?;
    }
    Ok(())
}
