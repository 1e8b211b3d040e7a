use cogq_srs::IntervalTableError;
use cogq_store::StoreError;
use thiserror::Error;

/// Message shown when the credential is missing or rejected.
pub const CREDENTIAL_ERROR_MESSAGE: &str =
    "کلید API شما نامعتبر است یا یافت نشد. لطفاً آن را در تنظیمات بررسی کنید.";

/// Failures while obtaining a batch of quiz questions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API key not found. Please set it in the application settings")]
    MissingCredential,
    #[error("API key was rejected by the question service")]
    InvalidCredential,
    #[error("Could not generate enough questions ({received} of {expected}). Please try again")]
    Insufficient { expected: usize, received: usize },
    #[error("Question service returned malformed questions: {0}")]
    Malformed(String),
    #[error("Failed to generate quiz questions: {0}")]
    Service(String),
}

impl GenerationError {
    /// Whether the learner has to enter a credential before retrying.
    pub const fn requires_credential(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential)
    }

    /// Text to show the learner.
    pub fn user_message(&self) -> String {
        if self.requires_credential() {
            CREDENTIAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub(crate) const fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::Insufficient { .. } => "insufficient",
            Self::Malformed(_) => "malformed",
            Self::Service(_) => "service",
        }
    }
}

/// Failures of the performance analysis; always recovered with fallback text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("API key not found")]
    MissingCredential,
    #[error("Failed to get performance analysis: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid SRS intervals: {0}")]
    Intervals(#[from] IntervalTableError),
    #[error("Question count must be at least 1")]
    QuestionCount,
    #[error("Quiz duration for {0} difficulty must be longer than zero")]
    Duration(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Another request is already in progress")]
    Busy,
    #[error("Not available while {0}")]
    InvalidPhase(&'static str),
    #[error("Nothing to review")]
    NothingToReview,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_route_to_setup() {
        assert!(GenerationError::MissingCredential.requires_credential());
        assert!(GenerationError::InvalidCredential.requires_credential());
        assert!(!GenerationError::Service("timeout".into()).requires_credential());
        assert!(
            !GenerationError::Insufficient {
                expected: 10,
                received: 8
            }
            .requires_credential()
        );
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            GenerationError::MissingCredential.user_message(),
            CREDENTIAL_ERROR_MESSAGE
        );
        let msg = GenerationError::Insufficient {
            expected: 10,
            received: 8,
        }
        .user_message();
        assert!(msg.contains("8 of 10"));
    }
}
