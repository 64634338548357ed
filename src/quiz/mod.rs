//! Automation readiness quiz: question bank, scoring engine and recommendation tiers.

pub mod bank;
pub mod engine;
pub mod language;
pub mod tiers;

pub use bank::{Industry, QuestionBank, QuestionKind};
pub use engine::{QuizEngine, QuizResults, QuizSnapshot, Step};
pub use language::Language;
pub use tiers::Priority;

/// Malformed quiz data, or input that cannot be mapped onto the question bank.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("Quiz configuration error: {0}")]
    Configuration(String),

    #[error("Unknown industry: {0}")]
    UnknownIndustry(String),

    #[error("Saved quiz does not match the question bank: {0}")]
    Snapshot(String),
}
