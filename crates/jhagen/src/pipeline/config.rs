use std::path::PathBuf;

use crate::config::Config;

pub struct ConvertConfig {
    pub template_path: PathBuf,
    pub header_primary_token: String,
    pub header_qualifier_token: String,
    pub noise_tokens: Vec<String>,
    pub min_step_chars: usize,
}

impl ConvertConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            template_path: PathBuf::from(&config.template_path),
            header_primary_token: config.header_primary_token.clone(),
            header_qualifier_token: config.header_qualifier_token.clone(),
            noise_tokens: config.noise_tokens.clone(),
            min_step_chars: config.min_step_chars,
        }
    }
}
