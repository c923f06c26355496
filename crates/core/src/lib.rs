#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod placement;

pub use engine::{Advance, AnswerFeedback, BatchOutcome, QuizEngine, QuizError, QuizProgress, RunKind};
pub use error::Error;
pub use placement::{LevelTally, PlacementReport, determine_level, score_placement};
