use std::time::Duration;
use thiserror::Error;

use crate::model::level::ProficiencyLevel;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("practice question count must be > 0")]
    InvalidPracticeCount,

    #[error("placement test needs at least one level")]
    NoPlacementLevels,

    #[error("placement levels must be strictly ascending")]
    UnorderedPlacementLevels,

    #[error("questions per level must be > 0")]
    InvalidQuestionsPerLevel,

    #[error("proficiency threshold must be between 1 and {max}, got {provided}")]
    InvalidThreshold { provided: u32, max: u32 },
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for both quiz modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    practice_question_count: u32,
    placement_levels: Vec<ProficiencyLevel>,
    questions_per_level: u32,
    proficiency_threshold: u32,
    result_delay: Duration,
}

impl Default for QuizSettings {
    /// 20 practice questions; placement over all five levels with 4 questions
    /// each, 3 correct to pass a level, and a 1.5 s "calculating" pause.
    fn default() -> Self {
        Self {
            practice_question_count: 20,
            placement_levels: ProficiencyLevel::ALL.to_vec(),
            questions_per_level: 4,
            proficiency_threshold: 3,
            result_delay: Duration::from_millis(1500),
        }
    }
}

impl QuizSettings {
    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a count is zero, the level list is empty or
    /// not ascending, or the threshold cannot be met with the per-level count.
    pub fn new(
        practice_question_count: u32,
        placement_levels: Vec<ProficiencyLevel>,
        questions_per_level: u32,
        proficiency_threshold: u32,
        result_delay: Duration,
    ) -> Result<Self, SettingsError> {
        if practice_question_count == 0 {
            return Err(SettingsError::InvalidPracticeCount);
        }
        if placement_levels.is_empty() {
            return Err(SettingsError::NoPlacementLevels);
        }
        if placement_levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SettingsError::UnorderedPlacementLevels);
        }
        if questions_per_level == 0 {
            return Err(SettingsError::InvalidQuestionsPerLevel);
        }
        if proficiency_threshold == 0 || proficiency_threshold > questions_per_level {
            return Err(SettingsError::InvalidThreshold {
                provided: proficiency_threshold,
                max: questions_per_level,
            });
        }

        Ok(Self {
            practice_question_count,
            placement_levels,
            questions_per_level,
            proficiency_threshold,
            result_delay,
        })
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidPracticeCount` for zero.
    pub fn with_practice_question_count(self, count: u32) -> Result<Self, SettingsError> {
        Self::new(
            count,
            self.placement_levels,
            self.questions_per_level,
            self.proficiency_threshold,
            self.result_delay,
        )
    }

    #[must_use]
    pub fn with_result_delay(mut self, delay: Duration) -> Self {
        self.result_delay = delay;
        self
    }

    // Accessors
    #[must_use]
    pub fn practice_question_count(&self) -> u32 {
        self.practice_question_count
    }

    #[must_use]
    pub fn placement_levels(&self) -> &[ProficiencyLevel] {
        &self.placement_levels
    }

    #[must_use]
    pub fn questions_per_level(&self) -> u32 {
        self.questions_per_level
    }

    #[must_use]
    pub fn proficiency_threshold(&self) -> u32 {
        self.proficiency_threshold
    }

    /// Pause between the last placement answer and the result screen.
    #[must_use]
    pub fn result_delay(&self) -> Duration {
        self.result_delay
    }

    /// Total number of questions requested for one placement test.
    #[must_use]
    pub fn placement_total(&self) -> u32 {
        let levels = u32::try_from(self.placement_levels.len()).unwrap_or(u32::MAX);
        levels.saturating_mul(self.questions_per_level)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
