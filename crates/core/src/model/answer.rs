use crate::model::ids::{OptionId, QuestionId};
use crate::model::level::ProficiencyLevel;
use crate::model::question::Question;

/// One graded placement-test response.
///
/// Keyed by the level the question was generated for, never by a level the
/// user picked. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    question_id: QuestionId,
    selected_option_id: OptionId,
    correct_option_id: OptionId,
    question_level: ProficiencyLevel,
}

impl GradedAnswer {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        selected_option_id: OptionId,
        correct_option_id: OptionId,
        question_level: ProficiencyLevel,
    ) -> Self {
        Self {
            question_id,
            selected_option_id,
            correct_option_id,
            question_level,
        }
    }

    /// Grade a submission against the question it answers.
    #[must_use]
    pub fn from_submission(question: &Question, selected: &OptionId) -> Self {
        Self::new(
            question.id().clone(),
            selected.clone(),
            question.correct_answer().clone(),
            question.level(),
        )
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn selected_option_id(&self) -> &OptionId {
        &self.selected_option_id
    }

    #[must_use]
    pub fn correct_option_id(&self) -> &OptionId {
        &self.correct_option_id
    }

    #[must_use]
    pub fn question_level(&self) -> ProficiencyLevel {
        self.question_level
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected_option_id == self.correct_option_id
    }
}
