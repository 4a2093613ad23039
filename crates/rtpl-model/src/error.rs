use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
    #[error("unknown value kind: {0}")]
    UnknownValueKind(String),
    #[error("unknown field nature: {0}")]
    UnknownFieldNature(String),
    #[error("unknown junction: {0}")]
    UnknownJunction(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
