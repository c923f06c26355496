use quiz_core::model::{GradedAnswer, ProficiencyLevel};
use quiz_core::{PlacementReport, QuizEngine};

/// Top-level mode the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ChoosingMode,
    Practice,
    PlacementTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeStage {
    /// Level selection; also where a failed load lands.
    Idle,
    Loading,
    Active(QuizEngine),
    Complete { score: u32, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementStage {
    Loading,
    Active(QuizEngine),
    /// All answers in; the result is revealed after the configured delay.
    Calculating { answers: Vec<GradedAnswer> },
    ShowingResult(PlacementReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    ChoosingMode,
    Practice(PracticeStage),
    Placement(PlacementStage),
}

/// Load the retry action would repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTarget {
    Practice(ProficiencyLevel),
    Placement,
}

/// A failed load, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub message: String,
    pub retry: Option<RetryTarget>,
}

/// The whole session. Only the reducer produces new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) generation: u64,
    pub(crate) stage: Stage,
    pub(crate) selected_level: Option<ProficiencyLevel>,
    pub(crate) last_error: Option<LoadFailure>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            generation: 0,
            stage: Stage::ChoosingMode,
            selected_level: None,
            last_error: None,
        }
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every reset and every load; late completions carrying an
    /// older value are ignored.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.stage {
            Stage::ChoosingMode => Mode::ChoosingMode,
            Stage::Practice(_) => Mode::Practice,
            Stage::Placement(_) => Mode::PlacementTest,
        }
    }

    #[must_use]
    pub fn selected_level(&self) -> Option<ProficiencyLevel> {
        self.selected_level
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&LoadFailure> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.stage,
            Stage::Practice(PracticeStage::Loading) | Stage::Placement(PlacementStage::Loading)
        )
    }

    /// The run in progress, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&QuizEngine> {
        match &self.stage {
            Stage::Practice(PracticeStage::Active(engine))
            | Stage::Placement(PlacementStage::Active(engine)) => Some(engine),
            _ => None,
        }
    }

    /// Whether a retry action is valid right now.
    #[must_use]
    pub fn retry_target(&self) -> Option<RetryTarget> {
        let target = self.last_error.as_ref()?.retry?;
        let applicable = match (target, &self.stage) {
            (RetryTarget::Practice(level), Stage::Practice(PracticeStage::Idle)) => {
                self.selected_level == Some(level)
            }
            (RetryTarget::Placement, Stage::ChoosingMode) => true,
            _ => false,
        };
        applicable.then_some(target)
    }

    /// Home is offered once the user has left the mode menu, and always
    /// alongside an error.
    #[must_use]
    pub fn can_go_home(&self) -> bool {
        if self.last_error.is_some() {
            return true;
        }
        match &self.stage {
            Stage::ChoosingMode => false,
            Stage::Practice(PracticeStage::Idle) => self.selected_level.is_some(),
            Stage::Practice(_) | Stage::Placement(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_the_mode_menu() {
        let state = SessionState::new();
        assert_eq!(state.mode(), Mode::ChoosingMode);
        assert_eq!(state.generation(), 0);
        assert!(!state.can_go_home());
        assert!(state.retry_target().is_none());
    }

    #[test]
    fn retry_only_applies_where_the_failed_load_left_off() {
        let mut state = SessionState {
            stage: Stage::Practice(PracticeStage::Idle),
            selected_level: Some(ProficiencyLevel::B1),
            last_error: Some(LoadFailure {
                message: "boom".into(),
                retry: Some(RetryTarget::Practice(ProficiencyLevel::B1)),
            }),
            ..SessionState::default()
        };
        assert_eq!(
            state.retry_target(),
            Some(RetryTarget::Practice(ProficiencyLevel::B1))
        );

        state.selected_level = None;
        assert!(state.retry_target().is_none());
        assert!(state.can_go_home());
    }

    #[test]
    fn practice_idle_without_level_hides_home() {
        let state = SessionState {
            stage: Stage::Practice(PracticeStage::Idle),
            ..SessionState::default()
        };
        assert!(!state.can_go_home());
        assert_eq!(state.mode(), Mode::Practice);
    }
}
