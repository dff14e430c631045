use crate::backend::BackendError;
use fm_core::FieldError;
use fm_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the edit session.
///
/// Missing field IDs never show up here: updating a field that no longer
/// exists is a silent no-op.
#[derive(Error, Debug)]
pub enum EditError {
    /// Bad input from the user; nothing was changed.
    #[error("{0}")]
    UserInput(String),

    #[error(transparent)]
    InvalidField(#[from] FieldError),

    #[error("not found: {0}")]
    NotFound(String),

    /// The operation needs state that isn't there yet (e.g. no PDF loaded).
    #[error("{0}")]
    Precondition(String),

    #[error("PDF backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl EditError {
    /// Should this be shown to the user as a correctable input problem?
    pub fn is_user_input(&self) -> bool {
        matches!(self, EditError::UserInput(_) | EditError::InvalidField(_))
    }

    pub(crate) fn no_document() -> Self {
        EditError::Precondition("no document is open; load a PDF first".to_string())
    }
}

impl From<StoreError> for EditError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EditError::NotFound(format!("saved document {id}")),
            other => EditError::Store(other),
        }
    }
}
