//! Pure session transitions.
//!
//! `reduce` never performs I/O; work it wants done comes back as an `Effect`
//! that the controller runs and answers with a completion event.

use std::time::Duration;

use log::{debug, info, warn};

use quiz_core::model::{GradedAnswer, OptionId, ProficiencyLevel, Question, QuizSettings};
use quiz_core::{Advance, BatchOutcome, QuizEngine, RunKind, score_placement};

use super::state::{
    LoadFailure, Mode, PlacementStage, PracticeStage, RetryTarget, SessionState, Stage,
};
use crate::error::ProviderError;
use crate::provider::BatchScope;
use crate::provider::parse::retain_in_scope;

//
// ─── EVENTS & EFFECTS ──────────────────────────────────────────────────────────
//

#[derive(Debug)]
pub enum SessionEvent {
    SelectMode(Mode),
    SelectPracticeLevel(ProficiencyLevel),
    SubmitAnswer(OptionId),
    Advance,
    GoHome,
    RetryLoad,
    PlayAgain,
    ChangeLevel,
    PracticeDeterminedLevel,
    PracticeDifferentLevel,
    RetakeTest,
    /// A fetch started under `generation` finished.
    QuestionsLoaded {
        generation: u64,
        result: Result<Vec<Question>, ProviderError>,
    },
    /// The reveal delay scheduled under `generation` elapsed.
    ResultDelayElapsed { generation: u64 },
}

/// Work requested by a transition. Each carries the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPractice {
        generation: u64,
        level: ProficiencyLevel,
        count: u32,
    },
    FetchPlacement {
        generation: u64,
        levels: Vec<ProficiencyLevel>,
        count_per_level: u32,
    },
    RevealResultAfter { generation: u64, delay: Duration },
}

#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with_effect(state: SessionState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

//
// ─── REDUCER ───────────────────────────────────────────────────────────────────
//

/// Apply `event` to `state`.
///
/// Events that make no sense for the current stage leave the state as it was.
#[must_use]
pub fn reduce(state: SessionState, event: SessionEvent, settings: &QuizSettings) -> Transition {
    match event {
        SessionEvent::GoHome => Transition::to(SessionState {
            generation: state.generation.wrapping_add(1),
            ..SessionState::default()
        }),
        SessionEvent::SelectMode(mode) => select_mode(state, mode, settings),
        SessionEvent::SelectPracticeLevel(level) => match state.stage {
            Stage::Practice(PracticeStage::Idle) => start_practice(state, level, settings),
            _ => reject(state, "select a practice level"),
        },
        SessionEvent::SubmitAnswer(option) => submit(state, &option, settings),
        SessionEvent::Advance => advance(state, settings),
        SessionEvent::RetryLoad => match state.retry_target() {
            Some(RetryTarget::Practice(level)) => start_practice(state, level, settings),
            Some(RetryTarget::Placement) => start_placement(state, settings),
            None => reject(state, "retry"),
        },
        SessionEvent::PlayAgain => match (&state.stage, state.selected_level) {
            (Stage::Practice(PracticeStage::Complete { .. }), Some(level)) => {
                start_practice(state, level, settings)
            }
            _ => reject(state, "play again"),
        },
        SessionEvent::ChangeLevel => match state.stage {
            Stage::Practice(PracticeStage::Complete { .. }) => practice_level_menu(state),
            _ => reject(state, "change level"),
        },
        SessionEvent::PracticeDeterminedLevel => match &state.stage {
            Stage::Placement(PlacementStage::ShowingResult(report)) => {
                let level = report.level;
                start_practice(state, level, settings)
            }
            _ => reject(state, "practice the determined level"),
        },
        SessionEvent::PracticeDifferentLevel => match state.stage {
            Stage::Placement(PlacementStage::ShowingResult(_)) => practice_level_menu(state),
            _ => reject(state, "practice a different level"),
        },
        SessionEvent::RetakeTest => match state.stage {
            Stage::Placement(PlacementStage::ShowingResult(_)) => start_placement(state, settings),
            _ => reject(state, "retake the test"),
        },
        SessionEvent::QuestionsLoaded { generation, result } => {
            if generation != state.generation {
                debug!(
                    "ignoring questions from generation {generation}, current is {}",
                    state.generation
                );
                return Transition::to(state);
            }
            questions_loaded(state, result, settings)
        }
        SessionEvent::ResultDelayElapsed { generation } => {
            if generation != state.generation {
                debug!("ignoring stale result reveal from generation {generation}");
                return Transition::to(state);
            }
            reveal_result(state, settings)
        }
    }
}

fn reject(state: SessionState, action: &str) -> Transition {
    warn!("cannot {action} in stage {:?}", state.mode());
    Transition::to(state)
}

fn select_mode(state: SessionState, mode: Mode, settings: &QuizSettings) -> Transition {
    if state.stage != Stage::ChoosingMode {
        return reject(state, "select a mode");
    }
    match mode {
        Mode::Practice => Transition::to(SessionState {
            stage: Stage::Practice(PracticeStage::Idle),
            selected_level: None,
            last_error: None,
            ..state
        }),
        Mode::PlacementTest => start_placement(state, settings),
        Mode::ChoosingMode => reject(state, "select the mode menu as a mode"),
    }
}

fn practice_level_menu(state: SessionState) -> Transition {
    Transition::to(SessionState {
        stage: Stage::Practice(PracticeStage::Idle),
        selected_level: None,
        last_error: None,
        ..state
    })
}

fn start_practice(state: SessionState, level: ProficiencyLevel, settings: &QuizSettings) -> Transition {
    let generation = state.generation.wrapping_add(1);
    let count = settings.practice_question_count();
    info!("loading {count} practice questions for {}", level.code());
    Transition::with_effect(
        SessionState {
            generation,
            stage: Stage::Practice(PracticeStage::Loading),
            selected_level: Some(level),
            last_error: None,
        },
        Effect::FetchPractice {
            generation,
            level,
            count,
        },
    )
}

fn start_placement(state: SessionState, settings: &QuizSettings) -> Transition {
    let generation = state.generation.wrapping_add(1);
    info!(
        "loading placement test: {} questions ({} levels x {})",
        settings.placement_total(),
        settings.placement_levels().len(),
        settings.questions_per_level()
    );
    Transition::with_effect(
        SessionState {
            generation,
            stage: Stage::Placement(PlacementStage::Loading),
            selected_level: None,
            last_error: None,
        },
        Effect::FetchPlacement {
            generation,
            levels: settings.placement_levels().to_vec(),
            count_per_level: settings.questions_per_level(),
        },
    )
}

fn questions_loaded(
    state: SessionState,
    result: Result<Vec<Question>, ProviderError>,
    settings: &QuizSettings,
) -> Transition {
    match (&state.stage, state.selected_level) {
        (Stage::Practice(PracticeStage::Loading), Some(level)) => {
            let scope = BatchScope::Practice {
                level,
                count: settings.practice_question_count(),
            };
            match start_run(RunKind::Practice, result, &scope) {
                Ok(engine) => {
                    info!("practice run started with {} questions", engine.len());
                    Transition::to(SessionState {
                        stage: Stage::Practice(PracticeStage::Active(engine)),
                        ..state
                    })
                }
                Err(message) => Transition::to(SessionState {
                    stage: Stage::Practice(PracticeStage::Idle),
                    last_error: Some(LoadFailure {
                        message,
                        retry: Some(RetryTarget::Practice(level)),
                    }),
                    ..state
                }),
            }
        }
        (Stage::Placement(PlacementStage::Loading), _) => {
            let scope = BatchScope::Placement {
                levels: settings.placement_levels().to_vec(),
                count_per_level: settings.questions_per_level(),
            };
            match start_run(RunKind::Placement, result, &scope) {
                Ok(engine) => {
                    info!("placement test started with {} questions", engine.len());
                    Transition::to(SessionState {
                        stage: Stage::Placement(PlacementStage::Active(engine)),
                        ..state
                    })
                }
                Err(message) => Transition::to(SessionState {
                    stage: Stage::ChoosingMode,
                    last_error: Some(LoadFailure {
                        message,
                        retry: Some(RetryTarget::Placement),
                    }),
                    ..state
                }),
            }
        }
        _ => {
            debug!("ignoring questions delivered outside a loading stage");
            Transition::to(state)
        }
    }
}

/// Filter a fetched batch and start an engine on it, or describe the failure.
fn start_run(
    kind: RunKind,
    result: Result<Vec<Question>, ProviderError>,
    scope: &BatchScope,
) -> Result<QuizEngine, String> {
    let fetched = result.map_err(|err| {
        warn!("question load failed: {err}");
        err.user_message()
    })?;

    let mut questions = retain_in_scope(fetched, scope);
    if kind == RunKind::Placement {
        questions.sort_by_key(Question::level);
    }

    QuizEngine::start(kind, questions).map_err(|err| {
        warn!("question load failed: {err}");
        scope.empty_error().user_message()
    })
}

fn submit(mut state: SessionState, option: &OptionId, settings: &QuizSettings) -> Transition {
    let submitted = match &mut state.stage {
        Stage::Practice(PracticeStage::Active(engine))
        | Stage::Placement(PlacementStage::Active(engine)) => {
            engine.submit_answer(option).map(|feedback| {
                debug!(
                    "answer {} to {}: {}",
                    feedback.selected_option_id,
                    feedback.question_id,
                    if feedback.correct { "correct" } else { "wrong" }
                );
                let all_answered =
                    engine.kind() == RunKind::Placement && engine.answers().len() == engine.len();
                all_answered.then(|| engine.answers().to_vec())
            })
        }
        _ => return reject(state, "submit an answer"),
    };

    match submitted {
        Ok(Some(answers)) => begin_calculating(state, answers, settings),
        Ok(None) => Transition::to(state),
        Err(err) => {
            warn!("answer rejected: {err}");
            Transition::to(state)
        }
    }
}

fn advance(mut state: SessionState, settings: &QuizSettings) -> Transition {
    let advanced = match &mut state.stage {
        Stage::Practice(PracticeStage::Active(engine))
        | Stage::Placement(PlacementStage::Active(engine)) => engine.advance(),
        _ => return reject(state, "advance"),
    };

    match advanced {
        Ok(Advance::Next) => Transition::to(state),
        Ok(Advance::Complete(BatchOutcome::Practice { score, total })) => {
            info!("practice run complete: {score}/{total}");
            Transition::to(SessionState {
                stage: Stage::Practice(PracticeStage::Complete { score, total }),
                ..state
            })
        }
        Ok(Advance::Complete(BatchOutcome::Placement { answers })) => {
            begin_calculating(state, answers, settings)
        }
        Err(err) => {
            warn!("advance rejected: {err}");
            Transition::to(state)
        }
    }
}

fn begin_calculating(
    state: SessionState,
    answers: Vec<GradedAnswer>,
    settings: &QuizSettings,
) -> Transition {
    debug!("all {} placement answers collected", answers.len());
    let generation = state.generation;
    Transition::with_effect(
        SessionState {
            stage: Stage::Placement(PlacementStage::Calculating { answers }),
            ..state
        },
        Effect::RevealResultAfter {
            generation,
            delay: settings.result_delay(),
        },
    )
}

fn reveal_result(state: SessionState, settings: &QuizSettings) -> Transition {
    let report = match &state.stage {
        Stage::Placement(PlacementStage::Calculating { answers }) => score_placement(
            answers,
            settings.placement_levels(),
            settings.proficiency_threshold(),
        ),
        _ => {
            debug!("ignoring result reveal outside the calculating stage");
            return Transition::to(state);
        }
    };
    info!("placement result: {}", report.level);
    Transition::to(SessionState {
        stage: Stage::Placement(PlacementStage::ShowingResult(report)),
        ..state
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
