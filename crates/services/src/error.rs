//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ProficiencyLevel;

/// Failures reported by a `QuestionProvider`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("question service returned an unusable payload: {0}")]
    MalformedPayload(String),
    #[error("question service returned no valid questions")]
    EmptyResult { level: Option<ProficiencyLevel> },
    #[error("question service quota exceeded")]
    QuotaExceeded,
    #[error("question service rejected the credentials")]
    Unauthorized,
    #[error("question service is not configured")]
    NotConfigured,
    #[error("question service unavailable: {0}")]
    Unavailable(String),
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    /// Text suitable for showing next to a retry button.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedPayload(_) => "Failed to read the generated questions. The AI might \
                have returned an invalid format. This often indicates an API key issue \
                (invalid, expired, or quota exceeded) or a problem with the AI service."
                .to_string(),
            Self::EmptyResult { level: Some(level) } => format!(
                "No questions could be generated for {level}. Please try a different level or try again later."
            ),
            Self::EmptyResult { level: None } => {
                "No questions could be generated for the placement test. Please try again later."
                    .to_string()
            }
            Self::QuotaExceeded => {
                "API quota exceeded. Please try again later or check your API billing.".to_string()
            }
            Self::Unauthorized => {
                "The question service rejected the API key. Please check your configuration."
                    .to_string()
            }
            Self::NotConfigured => {
                "The question service API key is not configured. Cannot fetch questions."
                    .to_string()
            }
            Self::Unavailable(reason) => format!("Failed to fetch questions: {reason}"),
            Self::HttpStatus(status) => {
                format!("Failed to fetch questions: the service answered with status {status}.")
            }
            Self::Http(err) => format!("Failed to fetch questions: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_names_the_level() {
        let err = ProviderError::EmptyResult {
            level: Some(ProficiencyLevel::B1),
        };
        let message = err.user_message();
        assert!(message.contains("B1 (Intermediate)"));

        let placement = ProviderError::EmptyResult { level: None }.user_message();
        assert!(placement.contains("placement test"));
    }

    #[test]
    fn quota_message_is_actionable() {
        assert!(ProviderError::QuotaExceeded.user_message().contains("quota"));
    }
}
