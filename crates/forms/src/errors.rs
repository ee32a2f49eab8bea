use thiserror::Error;

use crate::model::{FieldId, FormId};

pub type FormResult<T> = Result<T, FormError>;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no current form")]
    NoCurrentForm,

    #[error("form not found: {0}")]
    NotFound(FormId),

    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("index {index} out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(&'static str),
}
