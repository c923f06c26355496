mod answer;
mod ids;
mod level;
mod question;
mod settings;

pub use ids::{OptionId, QuestionId};
pub use level::{ParseLevelError, ProficiencyLevel};

pub use answer::GradedAnswer;
pub use question::{
    MULTIPLE_CHOICE, OPTIONS_PER_QUESTION, OptionDraft, Question, QuestionDraft, QuestionError,
    QuestionOption,
};
pub use settings::{QuizSettings, SettingsError};
