use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::debug;

use quiz_core::model::{ProficiencyLevel, Question};

use super::parse::parse_questions;
use super::{BatchScope, QuestionProvider};
use crate::error::ProviderError;

const SAMPLE_BANK: &str = include_str!("sample_bank.json");

/// A request the provider has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Practice {
        level: ProficiencyLevel,
        count: u32,
    },
    Placement {
        levels: Vec<ProficiencyLevel>,
        count_per_level: u32,
    },
}

type Scripted = VecDeque<Result<Vec<Question>, ProviderError>>;

#[derive(Default)]
struct Inner {
    bank: Vec<Question>,
    practice_script: Scripted,
    placement_script: Scripted,
    calls: Vec<ProviderCall>,
}

/// Provider backed by a fixed question bank.
///
/// Scripted responses are served first, in push order; once a queue is
/// drained requests fall back to the bank. Clones share state.
#[derive(Clone, Default)]
pub struct StaticQuestionProvider {
    inner: Arc<Mutex<Inner>>,
}

impl StaticQuestionProvider {
    #[must_use]
    pub fn new(bank: Vec<Question>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bank,
                ..Inner::default()
            })),
        }
    }

    /// The bundled offline bank: four German questions per level.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the bundled bank fails to parse.
    pub fn sample() -> Result<Self, ProviderError> {
        let scope = BatchScope::Placement {
            levels: ProficiencyLevel::ALL.to_vec(),
            count_per_level: 4,
        };
        let bank = parse_questions(SAMPLE_BANK, &scope)?;
        Ok(Self::new(bank))
    }

    /// Queue the next practice response.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the state lock is poisoned.
    pub fn push_practice(
        &self,
        response: Result<Vec<Question>, ProviderError>,
    ) -> Result<(), ProviderError> {
        self.lock()?.practice_script.push_back(response);
        Ok(())
    }

    /// Queue the next placement response.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the state lock is poisoned.
    pub fn push_placement(
        &self,
        response: Result<Vec<Question>, ProviderError>,
    ) -> Result<(), ProviderError> {
        self.lock()?.placement_script.push_back(response);
        Ok(())
    }

    /// Every request received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the state lock is poisoned.
    pub fn calls(&self) -> Result<Vec<ProviderCall>, ProviderError> {
        Ok(self.lock()?.calls.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ProviderError> {
        self.inner
            .lock()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }
}

fn take_level(bank: &[Question], level: ProficiencyLevel, count: u32) -> Vec<Question> {
    bank.iter()
        .filter(|question| question.level() == level)
        .take(usize::try_from(count).unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

#[async_trait]
impl QuestionProvider for StaticQuestionProvider {
    async fn request_practice_questions(
        &self,
        level: ProficiencyLevel,
        count: u32,
    ) -> Result<Vec<Question>, ProviderError> {
        let mut guard = self.lock()?;
        guard.calls.push(ProviderCall::Practice { level, count });
        if let Some(scripted) = guard.practice_script.pop_front() {
            debug!("serving scripted practice response");
            return scripted;
        }

        let questions = take_level(&guard.bank, level, count);
        if questions.is_empty() {
            return Err(ProviderError::EmptyResult { level: Some(level) });
        }
        Ok(questions)
    }

    async fn request_placement_questions(
        &self,
        levels: &[ProficiencyLevel],
        count_per_level: u32,
    ) -> Result<Vec<Question>, ProviderError> {
        let mut guard = self.lock()?;
        guard.calls.push(ProviderCall::Placement {
            levels: levels.to_vec(),
            count_per_level,
        });
        if let Some(scripted) = guard.placement_script.pop_front() {
            debug!("serving scripted placement response");
            return scripted;
        }

        let questions: Vec<Question> = levels
            .iter()
            .flat_map(|level| take_level(&guard.bank, *level, count_per_level))
            .collect();
        if questions.is_empty() {
            return Err(ProviderError::EmptyResult { level: None });
        }
        Ok(questions)
    }
}
