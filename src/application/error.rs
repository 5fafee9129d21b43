use thiserror::Error;

use crate::domain::{RegistryError, ValidationError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("No {what} number {index} (there are {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Category already exists: {0}")]
    DuplicateName(String),

    #[error("Storage error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl From<RegistryError> for LedgerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateName(name) => LedgerError::DuplicateName(name),
            RegistryError::IndexOutOfRange { index, len } => LedgerError::IndexOutOfRange {
                what: "category",
                index,
                len,
            },
            RegistryError::EmptyName => LedgerError::InvalidInput(ValidationError::EmptyName),
        }
    }
}
