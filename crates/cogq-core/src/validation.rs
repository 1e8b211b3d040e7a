use std::collections::HashSet;

use cogq_store::Question;

use crate::error::GenerationError;

/// Number of options every question must offer.
pub const OPTION_COUNT: usize = 4;

/// Check a single generated question.
pub fn validate_question(question: &Question) -> Result<(), GenerationError> {
    let malformed = |reason: String| Err(GenerationError::Malformed(reason));

    if question.id.trim().is_empty() {
        return malformed("question without an id".to_string());
    }

    if question.question_text.trim().is_empty() {
        return malformed(format!("question '{}' has no text", question.id));
    }

    if question.options.len() != OPTION_COUNT {
        return malformed(format!(
            "question '{}' has {} options, expected {}",
            question.id,
            question.options.len(),
            OPTION_COUNT
        ));
    }

    let distinct: HashSet<&str> = question.options.iter().map(String::as_str).collect();
    if distinct.len() != question.options.len() {
        return malformed(format!("question '{}' repeats an option", question.id));
    }

    if !distinct.contains(question.correct_answer.as_str()) {
        return malformed(format!(
            "question '{}' has a correct answer that is not among its options",
            question.id
        ));
    }

    Ok(())
}

/// Validate a generated batch and cut it to `expected` questions.
///
/// # Examples
/// ```
/// use cogq_core::validation::validate_batch;
///
/// assert!(validate_batch(Vec::new(), 10).is_err());
/// ```
pub fn validate_batch(
    mut questions: Vec<Question>,
    expected: usize,
) -> Result<Vec<Question>, GenerationError> {
    if questions.len() < expected || questions.is_empty() {
        return Err(GenerationError::Insufficient {
            expected,
            received: questions.len(),
        });
    }

    if questions.len() > expected {
        tracing::debug!(
            received = questions.len(),
            expected,
            "Dropping surplus generated questions"
        );
        questions.truncate(expected);
    }

    {
        let mut seen = HashSet::new();
        for question in &questions {
            validate_question(question)?;
            if !seen.insert(question.id.as_str()) {
                return Err(GenerationError::Malformed(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
        }
    }

    Ok(questions)
}
