//! Survey authoring: the in-progress draft, its validation and reordering.

pub mod editor;
pub mod reorder;
pub mod validate;

pub use editor::{Confirm, DraftEditor, QuestionField, MAX_COVER_BYTES, SEEDED_OPTIONS};
pub use reorder::DragSession;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Введіть назву опитування")]
    MissingTitle,
    #[error("Додайте хоча б одне питання")]
    NoQuestions,
    #[error("Введіть текст для питання {number}")]
    MissingQuestionText { number: usize },
    #[error("Питання {number}: додайте мінімум 2 варіанти")]
    NotEnoughOptions { number: usize },
    #[error("Питання {number} не існує")]
    NoSuchQuestion { number: usize },
    #[error("Питання {number}: варіанту {option} не існує")]
    NoSuchOption { number: usize, option: usize },
    #[error("Файл занадто великий (макс. 10MB)")]
    CoverTooLarge { size: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl DraftError {
    /// Local rule violations, as opposed to storage or remote failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingTitle
                | Self::NoQuestions
                | Self::MissingQuestionText { .. }
                | Self::NotEnoughOptions { .. }
        )
    }
}
