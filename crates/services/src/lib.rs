#![forbid(unsafe_code)]

pub mod error;
pub mod provider;
pub mod session;

pub use error::ProviderError;
pub use provider::{
    BatchScope, LlmConfig, LlmQuestionProvider, ProviderCall, QuestionProvider,
    StaticQuestionProvider,
};
pub use session::{
    Effect, Mode, SessionController, SessionEvent, SessionState, SessionView, Stage, StageTag,
};
