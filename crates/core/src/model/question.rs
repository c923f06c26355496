use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};
use crate::model::level::ProficiencyLevel;

/// Number of options every multiple-choice question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// The only question type the quiz can render.
pub const MULTIPLE_CHOICE: &str = "MULTIPLE_CHOICE";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question text cannot be empty")]
    EmptyText,

    #[error("unknown level {0:?}")]
    UnknownLevel(String),

    #[error("unsupported question type {0:?}")]
    UnsupportedType(String),

    #[error("expected {OPTIONS_PER_QUESTION} options, got {0}")]
    OptionCount(usize),

    #[error("option {index} has an empty id or text")]
    EmptyOption { index: usize },

    #[error("duplicate option id {0:?}")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not one of the option ids")]
    CorrectAnswerNotAnOption(String),
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Option exactly as the generator sent it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OptionDraft {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
}

/// Unvalidated question record, shaped like the generator's JSON.
///
/// Every field defaults so a single missing key becomes a validation error
/// for that item instead of failing the whole batch at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub level: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub question_text: String,
    pub options: Vec<OptionDraft>,
    #[serde(deserialize_with = "string_or_number")]
    pub correct_answer: String,
    pub explanation: Option<String>,
}

/// Generators sometimes emit ids as bare numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(number) => number.to_string(),
    })
}

impl QuestionDraft {
    /// Check every structural rule and build a `Question`.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` encountered.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(QuestionError::EmptyId);
        }

        let level: ProficiencyLevel = self
            .level
            .parse()
            .map_err(|_| QuestionError::UnknownLevel(self.level.clone()))?;

        if let Some(kind) = self.kind.as_deref() {
            if kind.trim() != MULTIPLE_CHOICE {
                return Err(QuestionError::UnsupportedType(kind.to_string()));
            }
        }

        let question_text = self.question_text.trim();
        if question_text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(QuestionError::OptionCount(self.options.len()));
        }

        let mut seen = HashSet::with_capacity(OPTIONS_PER_QUESTION);
        let mut options = Vec::with_capacity(OPTIONS_PER_QUESTION);
        for (index, draft) in self.options.into_iter().enumerate() {
            let option_id = draft.id.trim();
            let text = draft.text.trim();
            if option_id.is_empty() || text.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if !seen.insert(option_id.to_string()) {
                return Err(QuestionError::DuplicateOption(option_id.to_string()));
            }
            options.push(QuestionOption {
                id: OptionId::new(option_id),
                text: text.to_string(),
            });
        }

        let correct = self.correct_answer.trim();
        if !seen.contains(correct) {
            return Err(QuestionError::CorrectAnswerNotAnOption(
                self.correct_answer.clone(),
            ));
        }

        let explanation = self
            .explanation
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Question {
            id: QuestionId::new(id),
            level,
            question_text: question_text.to_string(),
            options,
            correct_answer: OptionId::new(correct),
            explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
}

/// A validated multiple-choice question.
///
/// Only obtainable through `QuestionDraft::validate`, so every instance has
/// exactly four distinct options and a correct answer among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    level: ProficiencyLevel,
    question_text: String,
    options: Vec<QuestionOption>,
    correct_answer: OptionId,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// The difficulty the question was generated for.
    #[must_use]
    pub fn level(&self) -> ProficiencyLevel {
        self.level
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &OptionId {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, option_id: &OptionId) -> bool {
        self.options.iter().any(|option| &option.id == option_id)
    }

    #[must_use]
    pub fn option(&self, option_id: &OptionId) -> Option<&QuestionOption> {
        self.options.iter().find(|option| &option.id == option_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
