//! Core types for faqbot: configuration, the error taxonomy shared by every
//! surface, the Training Record domain, and prompt assembly.

pub mod config;
pub mod domain;
pub mod errors;
pub mod prompt;

pub use domain::training::{
    article_summary, QuestionId, TrainingRecord, UserId, ARTICLE_QUESTION_LABEL,
    SUMMARY_CHAR_LIMIT,
};
pub use errors::{ApplicationError, InterfaceError};
pub use prompt::PromptAssembler;
