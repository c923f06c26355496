use quiz_core::model::{ProficiencyLevel, Question};
use quiz_core::{AnswerFeedback, LevelTally, QuizProgress};

use super::state::{PlacementStage, PracticeStage, SessionState, Stage};

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTag {
    ChoosingMode,
    PracticeLevelSelect,
    PracticeLoading,
    PracticeActive,
    PracticeComplete,
    PlacementLoading,
    PlacementActive,
    PlacementCalculating,
    PlacementResult,
}

/// Presentation-agnostic snapshot of the session.
///
/// Carries no formatting beyond the fixed status and error messages; the
/// front end decides how to lay it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub stage: StageTag,
    pub selected_level: Option<ProficiencyLevel>,
    pub question: Option<Question>,
    pub feedback: Option<AnswerFeedback>,
    pub progress: Option<QuizProgress>,
    /// Correct answers so far in a practice run.
    pub running_score: Option<u32>,
    pub final_score: Option<(u32, usize)>,
    pub determined_level: Option<ProficiencyLevel>,
    pub tally: Option<LevelTally>,
    pub loading_message: Option<String>,
    pub error_message: Option<String>,
    pub can_retry: bool,
    pub can_go_home: bool,
}

impl SessionView {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let engine = state.engine();
        let mut view = Self {
            stage: stage_tag(state.stage()),
            selected_level: state.selected_level(),
            question: engine.and_then(|e| e.current_question().cloned()),
            feedback: engine.and_then(|e| e.pending_feedback().cloned()),
            progress: engine.map(|e| e.progress()),
            running_score: None,
            final_score: None,
            determined_level: None,
            tally: None,
            loading_message: loading_message(state),
            error_message: state.last_error().map(|error| error.message.clone()),
            can_retry: state.retry_target().is_some(),
            can_go_home: state.can_go_home(),
        };

        match state.stage() {
            Stage::Practice(PracticeStage::Active(engine)) => {
                view.running_score = Some(engine.score());
            }
            Stage::Practice(PracticeStage::Complete { score, total }) => {
                view.final_score = Some((*score, *total));
            }
            Stage::Placement(PlacementStage::ShowingResult(report)) => {
                view.determined_level = Some(report.level);
                view.tally = Some(report.tally);
            }
            _ => {}
        }
        view
    }
}

fn stage_tag(stage: &Stage) -> StageTag {
    match stage {
        Stage::ChoosingMode => StageTag::ChoosingMode,
        Stage::Practice(PracticeStage::Idle) => StageTag::PracticeLevelSelect,
        Stage::Practice(PracticeStage::Loading) => StageTag::PracticeLoading,
        Stage::Practice(PracticeStage::Active(_)) => StageTag::PracticeActive,
        Stage::Practice(PracticeStage::Complete { .. }) => StageTag::PracticeComplete,
        Stage::Placement(PlacementStage::Loading) => StageTag::PlacementLoading,
        Stage::Placement(PlacementStage::Active(_)) => StageTag::PlacementActive,
        Stage::Placement(PlacementStage::Calculating { .. }) => StageTag::PlacementCalculating,
        Stage::Placement(PlacementStage::ShowingResult(_)) => StageTag::PlacementResult,
    }
}

fn loading_message(state: &SessionState) -> Option<String> {
    match state.stage() {
        Stage::Practice(PracticeStage::Loading) => {
            let subject = state
                .selected_level()
                .map_or("Deutsch", ProficiencyLevel::label);
            Some(format!("Please wait, AI is generating {subject} questions..."))
        }
        Stage::Placement(PlacementStage::Loading) => {
            Some("Please wait, AI is generating your placement test questions...".to_string())
        }
        Stage::Placement(PlacementStage::Calculating { .. }) => {
            Some("Calculating your placement result...".to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{LoadFailure, RetryTarget};

    #[test]
    fn menu_view_is_bare() {
        let view = SessionView::from_state(&SessionState::new());
        assert_eq!(view.stage, StageTag::ChoosingMode);
        assert!(view.question.is_none());
        assert!(view.loading_message.is_none());
        assert!(!view.can_go_home);
        assert!(!view.can_retry);
    }

    #[test]
    fn practice_loading_names_the_level() {
        let state = SessionState {
            stage: Stage::Practice(PracticeStage::Loading),
            selected_level: Some(ProficiencyLevel::A2),
            ..SessionState::default()
        };
        let view = SessionView::from_state(&state);
        assert_eq!(view.stage, StageTag::PracticeLoading);
        assert_eq!(
            view.loading_message.as_deref(),
            Some("Please wait, AI is generating A2 (Elementary) questions...")
        );
        assert!(view.can_go_home);
    }

    #[test]
    fn error_view_offers_retry_and_home() {
        let state = SessionState {
            stage: Stage::ChoosingMode,
            last_error: Some(LoadFailure {
                message: "No questions could be generated.".into(),
                retry: Some(RetryTarget::Placement),
            }),
            ..SessionState::default()
        };
        let view = SessionView::from_state(&state);
        assert_eq!(
            view.error_message.as_deref(),
            Some("No questions could be generated.")
        );
        assert!(view.can_retry);
        assert!(view.can_go_home);
    }

    #[test]
    fn complete_view_reports_final_score() {
        let state = SessionState {
            stage: Stage::Practice(PracticeStage::Complete { score: 7, total: 10 }),
            selected_level: Some(ProficiencyLevel::B1),
            ..SessionState::default()
        };
        let view = SessionView::from_state(&state);
        assert_eq!(view.final_score, Some((7, 10)));
        assert!(view.running_score.is_none());
    }
}
