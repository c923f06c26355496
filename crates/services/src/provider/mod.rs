//! Question generation behind a single async seam.

mod llm;
mod memory;
pub mod parse;
mod prompt;

use async_trait::async_trait;

use quiz_core::model::{ProficiencyLevel, Question};

pub use crate::error::ProviderError;
pub use llm::{LlmConfig, LlmQuestionProvider};
pub use memory::{ProviderCall, StaticQuestionProvider};
pub use prompt::{placement_prompt, practice_prompt};

/// Source of generated questions.
///
/// Implementations may return fewer questions than requested; callers
/// validate and filter again before use.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Questions for a single level.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, quota, auth or payload failures.
    async fn request_practice_questions(
        &self,
        level: ProficiencyLevel,
        count: u32,
    ) -> Result<Vec<Question>, ProviderError>;

    /// Questions spread over `levels`, each tagged with its own level.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, quota, auth or payload failures.
    async fn request_placement_questions(
        &self,
        levels: &[ProficiencyLevel],
        count_per_level: u32,
    ) -> Result<Vec<Question>, ProviderError>;
}

/// What a batch was requested for; decides which items are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchScope {
    Practice {
        level: ProficiencyLevel,
        count: u32,
    },
    Placement {
        levels: Vec<ProficiencyLevel>,
        count_per_level: u32,
    },
}

impl BatchScope {
    #[must_use]
    pub fn allows(&self, level: ProficiencyLevel) -> bool {
        match self {
            Self::Practice { level: wanted, .. } => *wanted == level,
            Self::Placement { levels, .. } => levels.contains(&level),
        }
    }

    /// Number of questions asked for.
    #[must_use]
    pub fn requested(&self) -> usize {
        let total = match self {
            Self::Practice { count, .. } => *count,
            Self::Placement {
                levels,
                count_per_level,
            } => u32::try_from(levels.len())
                .unwrap_or(u32::MAX)
                .saturating_mul(*count_per_level),
        };
        usize::try_from(total).unwrap_or(usize::MAX)
    }

    /// The failure reported when nothing usable is left.
    #[must_use]
    pub fn empty_error(&self) -> ProviderError {
        match self {
            Self::Practice { level, .. } => ProviderError::EmptyResult {
                level: Some(*level),
            },
            Self::Placement { .. } => ProviderError::EmptyResult { level: None },
        }
    }
}
