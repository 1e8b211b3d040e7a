use std::sync::Arc;
use std::time::Duration;

use crate::common::{self, TEST_CREDENTIAL, TestAppBuilder, play_quiz};
use cogq_core::error::CREDENTIAL_ERROR_MESSAGE;
use cogq_core::{AppError, CHAPTERS, GenerationError, Phase, StudyConfig};
use cogq_store::settings::{CREDENTIAL_KEY, THEME_KEY};
use cogq_store::{Difficulty, KeyValueStore, MemoryStore, Theme};

#[tokio::test]
async fn test_startup_routes_on_credential() -> anyhow::Result<()> {
    let t = TestAppBuilder::new().build()?;
    assert!(matches!(t.app.phase(), Phase::Home));
    assert!(t.app.context().credential.is_some());

    let t = TestAppBuilder::new().without_credential().build()?;
    assert!(matches!(t.app.phase(), Phase::CredentialSetup));
    assert_eq!(t.app.context().theme, Theme::Dark);

    Ok(())
}

#[tokio::test]
async fn test_short_batch_does_not_start_quiz() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.generator.push(Ok(common::questions("short", 8)));

    let err = t
        .app
        .start_quiz(CHAPTERS[0], Difficulty::Medium)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Generation(GenerationError::Insufficient {
            expected: 10,
            received: 8
        })
    ));
    assert!(matches!(t.app.phase(), Phase::Home));
    assert!(t.app.last_error().unwrap().contains("8 of 10"));
    assert!(t.app.countdown_mut().is_none());
    assert!(t.app.progress().load_history()?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_surplus_questions_are_truncated() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.generator.push(Ok(common::questions("extra", 12)));

    t.app.start_quiz(CHAPTERS[5], Difficulty::Easy).await?;
    assert_eq!(t.app.quiz().unwrap().len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_malformed_batch_is_rejected() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    let mut batch = common::questions("m", 10);
    batch[3].correct_answer = "not an option".to_string();
    t.generator.push(Ok(batch));

    let err = t
        .app
        .start_quiz(CHAPTERS[0], Difficulty::Easy)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Generation(GenerationError::Malformed(_))
    ));
    assert!(matches!(t.app.phase(), Phase::Home));

    Ok(())
}

#[tokio::test]
async fn test_missing_credential_routes_to_setup() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().without_credential().build()?;
    t.app.go_home();

    let err = t
        .app
        .start_quiz(CHAPTERS[1], Difficulty::Hard)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Generation(GenerationError::MissingCredential)
    ));
    assert!(matches!(t.app.phase(), Phase::CredentialSetup));
    assert_eq!(t.app.last_error(), Some(CREDENTIAL_ERROR_MESSAGE));
    assert_eq!(t.generator.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_rejected_credential_routes_to_setup() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.generator.push(Err(GenerationError::InvalidCredential));

    assert!(t.app.start_quiz(CHAPTERS[1], Difficulty::Easy).await.is_err());
    assert!(matches!(t.app.phase(), Phase::CredentialSetup));
    assert_eq!(t.app.last_error(), Some(CREDENTIAL_ERROR_MESSAGE));

    Ok(())
}

#[tokio::test]
async fn test_retry_after_service_failure() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.generator
        .push(Err(GenerationError::Service("503 overloaded".to_string())));

    assert!(t.app.start_quiz(CHAPTERS[7], Difficulty::Medium).await.is_err());
    assert!(matches!(t.app.phase(), Phase::Home));
    assert!(t.app.last_error().unwrap().contains("503 overloaded"));

    t.app.retry_quiz().await?;
    let quiz = t.app.quiz().expect("retry should start the quiz");
    assert_eq!(quiz.chapter_title(), CHAPTERS[7].title);
    assert_eq!(quiz.difficulty(), Difficulty::Medium);
    assert_eq!(t.app.last_error(), None);
    assert_eq!(t.generator.calls(), 2);

    Ok(())
}

#[tokio::test]
async fn test_retry_without_selection_is_refused() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    assert!(matches!(
        t.app.retry_quiz().await,
        Err(AppError::InvalidPhase(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_starting_new_quiz_abandons_running_one() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.app.start_quiz(CHAPTERS[0], Difficulty::Easy).await?;
    t.app.submit_answer("b")?;

    t.app.start_quiz(CHAPTERS[1], Difficulty::Hard).await?;
    let quiz = t.app.quiz().unwrap();
    assert_eq!(quiz.chapter_title(), CHAPTERS[1].title);
    assert!(quiz.answers().is_empty());
    assert_eq!(t.app.countdown_mut().unwrap().remaining_secs(), 240);

    // Nothing from the abandoned quiz was recorded
    assert!(t.app.progress().load_history()?.is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_load_blocks_until_home() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.generator.hang();

    let pending = tokio::time::timeout(
        Duration::from_secs(30),
        t.app.start_quiz(CHAPTERS[0], Difficulty::Easy),
    )
    .await;
    assert!(pending.is_err());
    assert!(matches!(t.app.phase(), Phase::LoadingQuiz));

    assert!(matches!(t.app.start_practice(), Err(AppError::Busy)));
    assert!(matches!(
        t.app.start_quiz(CHAPTERS[1], Difficulty::Easy).await,
        Err(AppError::Busy)
    ));
    assert!(matches!(t.app.show_stats(), Err(AppError::Busy)));
    assert_eq!(t.generator.calls(), 1);

    t.app.go_home();
    assert!(matches!(t.app.phase(), Phase::Home));
    assert!(matches!(
        t.app.start_practice(),
        Err(AppError::NothingToReview)
    ));

    Ok(())
}

#[tokio::test]
async fn test_quiz_actions_outside_quiz_are_refused() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    assert!(matches!(
        t.app.submit_answer("a"),
        Err(AppError::InvalidPhase(_))
    ));
    assert!(matches!(
        t.app.advance_quiz().await,
        Err(AppError::InvalidPhase(_))
    ));
    assert!(!t.app.expire_quiz().await);
    Ok(())
}

#[tokio::test]
async fn test_credential_lifecycle() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().without_credential().build()?;

    assert!(t.app.save_credential("   ").is_err());
    assert!(matches!(t.app.phase(), Phase::CredentialSetup));

    t.app.save_credential("  new-key ")?;
    assert!(matches!(t.app.phase(), Phase::Home));
    assert_eq!(t.kv.get(CREDENTIAL_KEY)?.as_deref(), Some("new-key"));
    assert_eq!(
        t.app.context().credential.as_ref().map(|c| c.expose()),
        Some("new-key")
    );

    t.app.clear_credential()?;
    assert!(t.app.context().credential.is_none());
    assert!(t.kv.get(CREDENTIAL_KEY)?.is_none());
    assert!(matches!(t.app.phase(), Phase::CredentialSetup));

    Ok(())
}

#[tokio::test]
async fn test_theme_toggle_persists() -> anyhow::Result<()> {
    let kv = Arc::new(MemoryStore::new());
    let mut t = TestAppBuilder::new().with_store(kv.clone()).build()?;

    assert_eq!(t.app.toggle_theme()?, Theme::Light);
    assert_eq!(kv.get(THEME_KEY)?.as_deref(), Some("light"));

    // A fresh app over the same store picks the preference up
    let t = TestAppBuilder::new().with_store(kv).build()?;
    assert_eq!(t.app.context().theme, Theme::Light);
    assert_eq!(
        t.kv.get(CREDENTIAL_KEY)?.as_deref(),
        Some(TEST_CREDENTIAL)
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_config_is_rejected() -> anyhow::Result<()> {
    let config = StudyConfig {
        srs_intervals_days: Vec::new(),
        ..StudyConfig::default()
    };
    assert!(matches!(
        TestAppBuilder::new().with_config(config).build(),
        Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::Config(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn test_custom_question_count() -> anyhow::Result<()> {
    let config = StudyConfig {
        question_count: 5,
        ..StudyConfig::default()
    };
    let mut t = TestAppBuilder::new().with_config(config).build()?;

    t.app.start_quiz(CHAPTERS[8], Difficulty::Medium).await?;
    assert_eq!(t.app.quiz().unwrap().len(), 5);
    play_quiz(&mut t.app, 4).await?;
    assert_eq!(t.app.result().unwrap().score, 80.0);

    Ok(())
}

#[tokio::test]
async fn test_stats_report() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;

    t.app.start_quiz(CHAPTERS[4], Difficulty::Hard).await?;
    play_quiz(&mut t.app, 6).await?;
    t.app.start_quiz(CHAPTERS[4], Difficulty::Easy).await?;
    play_quiz(&mut t.app, 9).await?;
    t.app.start_quiz(CHAPTERS[0], Difficulty::Easy).await?;
    play_quiz(&mut t.app, 5).await?;

    let report = t.app.show_stats()?;
    assert!(matches!(t.app.phase(), Phase::Stats));
    assert_eq!(report.attempts, 3);

    // Chapters follow catalog order
    assert_eq!(report.chapters.len(), 2);
    assert_eq!(report.chapters[0].chapter_id, 1);
    assert_eq!(report.chapters[0].average, 50);
    assert_eq!(report.chapters[1].chapter_id, 5);
    assert_eq!(report.chapters[1].average, 75);
    assert_eq!(report.chapters[1].attempts, 2);

    assert_eq!(report.difficulties.len(), 2);
    assert_eq!(report.difficulties[0].difficulty, Difficulty::Easy);
    assert_eq!(report.difficulties[0].average, 70);
    assert_eq!(report.difficulties[1].difficulty, Difficulty::Hard);
    assert_eq!(report.difficulties[1].average, 60);

    let scores: Vec<_> = report.timeline.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![60, 90, 50]);

    Ok(())
}

#[tokio::test]
async fn test_reset_progress_clears_everything() -> anyhow::Result<()> {
    let mut t = TestAppBuilder::new().build()?;
    t.app.start_quiz(CHAPTERS[2], Difficulty::Medium).await?;
    play_quiz(&mut t.app, 5).await?;

    let first = t.app.result().unwrap().questions[0].clone();
    assert!(t.app.toggle_bookmark(&first)?);

    let summary = t.app.home_summary()?;
    assert_eq!(summary.practice_items, 5);
    assert_eq!(summary.due_items, 5);
    assert_eq!(summary.bookmarks, 1);

    t.app.reset_progress()?;
    assert!(matches!(t.app.phase(), Phase::Home));
    assert!(t.app.progress().load_history()?.is_empty());
    assert_eq!(t.app.home_summary()?.practice_items, 0);
    assert_eq!(t.app.home_summary()?.bookmarks, 0);

    // Settings survive a progress reset
    assert!(t.app.context().credential.is_some());
    assert!(t.kv.get(CREDENTIAL_KEY)?.is_some());

    Ok(())
}
