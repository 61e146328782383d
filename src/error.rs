use thiserror::Error;

use crate::model::ServiceId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("an invoice needs at least one service")]
    LastService,
    #[error("no service with id {0}")]
    UnknownService(ServiceId),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing failed: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("TOML serialization failed: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Record is not ready for download: {0}")]
    IncompleteRecord(String),
}
