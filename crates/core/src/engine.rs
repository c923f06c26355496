use std::fmt;
use thiserror::Error;

use crate::model::{GradedAnswer, OptionId, Question, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected engine calls. None of these change engine state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions to start a quiz with")]
    EmptyBatch,

    #[error("quiz already finished")]
    Finished,

    #[error("current question is already answered")]
    AwaitingAdvance,

    #[error("no answered question to advance from")]
    NothingToAdvance,

    #[error("option {option} is not part of question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },
}

//
// ─── RUN TYPES ─────────────────────────────────────────────────────────────────
//

/// What a run accumulates: a raw score or graded answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Practice,
    Placement,
}

/// Result of a submission, shown until the user advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub selected_option_id: OptionId,
    pub correct: bool,
    pub correct_option_id: OptionId,
    pub explanation: Option<String>,
}

/// What a finished run hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Practice { score: u32, total: usize },
    Placement { answers: Vec<GradedAnswer> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next,
    Complete(BatchOutcome),
}

/// Position within a run, useful for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based number of the question on screen (clamped to `total`).
    pub position: usize,
    pub total: usize,
    pub answered: usize,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Steps through one loaded batch of questions.
///
/// Each question goes through submit → feedback → advance. The engine never
/// mutates on a rejected call, so a stray click can't corrupt the score.
#[derive(Clone, PartialEq, Eq)]
pub struct QuizEngine {
    kind: RunKind,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    answers: Vec<GradedAnswer>,
    answered: usize,
    pending: Option<AnswerFeedback>,
    finished: bool,
}

impl QuizEngine {
    /// Start a run over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyBatch` when there is nothing to ask.
    pub fn start(kind: RunKind, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyBatch);
        }

        Ok(Self {
            kind,
            questions,
            current: 0,
            score: 0,
            answers: Vec::new(),
            answered: 0,
            pending: None,
            finished: false,
        })
    }

    #[must_use]
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Correct answers so far. Always zero for placement runs.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Graded answers so far. Always empty for practice runs.
    #[must_use]
    pub fn answers(&self) -> &[GradedAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn pending_feedback(&self) -> Option<&AnswerFeedback> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        QuizProgress {
            position: (self.current + 1).min(total),
            total,
            answered: self.answered,
        }
    }

    /// Grade `option_id` against the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` after completion, `QuizError::AwaitingAdvance`
    /// while feedback is pending, and `QuizError::UnknownOption` when the id is
    /// not one of the question's options.
    pub fn submit_answer(&mut self, option_id: &OptionId) -> Result<AnswerFeedback, QuizError> {
        if self.pending.is_some() {
            return Err(QuizError::AwaitingAdvance);
        }
        let question = self.current_question().ok_or(QuizError::Finished)?;
        if !question.has_option(option_id) {
            return Err(QuizError::UnknownOption {
                question: question.id().clone(),
                option: option_id.clone(),
            });
        }

        let correct = option_id == question.correct_answer();
        let feedback = AnswerFeedback {
            question_id: question.id().clone(),
            selected_option_id: option_id.clone(),
            correct,
            correct_option_id: question.correct_answer().clone(),
            explanation: question.explanation().map(str::to_owned),
        };

        match self.kind {
            RunKind::Practice => {
                if correct {
                    self.score = self.score.saturating_add(1);
                }
            }
            RunKind::Placement => {
                let graded = GradedAnswer::from_submission(question, option_id);
                self.answers.push(graded);
            }
        }

        self.answered += 1;
        self.pending = Some(feedback.clone());
        Ok(feedback)
    }

    /// Move past the answered question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` after completion and
    /// `QuizError::NothingToAdvance` when no answer is pending.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if self.pending.is_none() {
            return Err(QuizError::NothingToAdvance);
        }

        self.pending = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return Ok(Advance::Next);
        }

        self.finished = true;
        let outcome = match self.kind {
            RunKind::Practice => BatchOutcome::Practice {
                score: self.score,
                total: self.questions.len(),
            },
            RunKind::Placement => BatchOutcome::Placement {
                answers: self.answers.clone(),
            },
        };
        Ok(Advance::Complete(outcome))
    }
}

impl fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizEngine")
            .field("kind", &self.kind)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("answers_len", &self.answers.len())
            .field("pending", &self.pending.is_some())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
