use std::mem;
use std::sync::Arc;

use log::{debug, info};
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{ProficiencyLevel, Question, QuizSettings};

use super::reducer::{Effect, SessionEvent, reduce};
use super::state::SessionState;
use super::view::SessionView;
use crate::provider::QuestionProvider;

/// Owns the session state and runs the effects its transitions request.
///
/// `handle` is synchronous and never blocks; `perform` does the waiting.
/// Drivers that interleave user input with pending work call the two
/// separately, simple ones use `dispatch`.
pub struct SessionController<P> {
    state: SessionState,
    settings: QuizSettings,
    provider: Arc<P>,
    shuffle: bool,
}

impl<P: QuestionProvider + 'static> SessionController<P> {
    #[must_use]
    pub fn new(provider: P, settings: QuizSettings) -> Self {
        Self {
            state: SessionState::new(),
            settings,
            provider: Arc::new(provider),
            shuffle: false,
        }
    }

    /// Shuffle practice batches before they reach the engine.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::from_state(&self.state)
    }

    /// Apply one event and return the follow-up work, if any.
    pub fn handle(&mut self, event: SessionEvent) -> Option<Effect> {
        let current = mem::take(&mut self.state);
        let transition = reduce(current, event, &self.settings);
        self.state = transition.state;
        transition.effect
    }

    /// Run `effect` to completion and describe the outcome as an event.
    ///
    /// The returned future does not borrow the controller, so a driver can
    /// keep handling input while it is pending.
    pub fn perform(&self, effect: Effect) -> impl Future<Output = SessionEvent> + Send + use<P> {
        let provider = Arc::clone(&self.provider);
        let shuffle = self.shuffle;
        async move { run_effect(provider.as_ref(), effect, shuffle).await }
    }

    /// Apply `event` and keep running effects until none remain.
    pub async fn dispatch(&mut self, event: SessionEvent) -> SessionView {
        let mut next = self.handle(event);
        while let Some(effect) = next {
            let completion = self.perform(effect).await;
            next = self.handle(completion);
        }
        self.view()
    }
}

async fn run_effect<P: QuestionProvider>(provider: &P, effect: Effect, shuffle: bool) -> SessionEvent {
    match effect {
        Effect::FetchPractice {
            generation,
            level,
            count,
        } => {
            let mut result = provider.request_practice_questions(level, count).await;
            if shuffle {
                if let Ok(questions) = result.as_mut() {
                    questions.as_mut_slice().shuffle(&mut rng());
                }
            }
            SessionEvent::QuestionsLoaded { generation, result }
        }
        Effect::FetchPlacement {
            generation,
            levels,
            count_per_level,
        } => {
            let result = provider
                .request_placement_questions(&levels, count_per_level)
                .await;
            if let Ok(questions) = &result {
                log_distribution(questions);
            }
            SessionEvent::QuestionsLoaded { generation, result }
        }
        Effect::RevealResultAfter { generation, delay } => {
            tokio::time::sleep(delay).await;
            SessionEvent::ResultDelayElapsed { generation }
        }
    }
}

fn log_distribution(questions: &[Question]) {
    info!("received {} placement questions", questions.len());
    for level in ProficiencyLevel::ALL {
        let count = questions.iter().filter(|q| q.level() == level).count();
        debug!("  {}: {count}", level.code());
    }
}
