use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JhagenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Document error: {0}")]
    Docx(#[from] DocxError),

    #[error("Conversion error: {0}")]
    Convert(#[from] crate::pipeline::ConvertError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Failed to open document package: {0}")]
    OpenPackage(String),

    #[error("Document package is missing entry '{0}'")]
    MissingEntry(String),

    #[error("Failed to read package entry '{entry}': {source}")]
    ReadEntry {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("Failed to write document package: {0}")]
    WritePackage(String),
}

pub type Result<T> = std::result::Result<T, JhagenError>;
