use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// MIME type of the generated document, for embedding callers that serve
/// the bytes over HTTP.
pub const JHA_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Converter configuration. Every field has a default so a missing config
/// file still yields a working setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Path to the JHA template document.
    pub template_path: String,

    /// Filename offered for the generated document.
    pub output_filename: String,

    /// Classification model identifier.
    pub model: String,

    /// Classification API base URL. Overridable for self-hosted gateways
    /// and for tests.
    pub api_base_url: String,

    /// API key sources, checked in this order (see [`crate::secrets`]).
    pub api_key: Option<String>,
    pub api_key_file: Option<String>,
    pub api_key_env_var: Option<String>,

    /// Both tokens must appear in a header cell for its column to be
    /// treated as the step-description column.
    pub header_primary_token: String,
    pub header_qualifier_token: String,

    /// Extra tokens that mark a source row as boilerplate (organization
    /// names, footer text), matched case-insensitively. The header
    /// primary token and "DO NOT DELETE" are always applied on top of
    /// these.
    pub noise_tokens: Vec<String>,

    /// Rows whose trimmed step text is at most this long are dropped.
    pub min_step_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_path: "Template.docx".to_string(),
            output_filename: "Final_JHA.docx".to_string(),
            model: "gpt-4o".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: Some("OPENAI_API_KEY".to_string()),
            header_primary_token: "DESCRIPTION".to_string(),
            header_qualifier_token: "OPERATION".to_string(),
            noise_tokens: Vec::new(),
            min_step_chars: 3,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.header_primary_token.trim().is_empty()
        || config.header_qualifier_token.trim().is_empty()
    {
        return Err(ConfigError::Validation {
            message: "Header tokens must not be empty".to_string(),
        });
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Model must not be empty".to_string(),
        });
    }

    if config.template_path.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "Template path must not be empty".to_string(),
        });
    }

    Ok(())
}
