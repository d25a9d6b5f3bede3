use std::sync::Arc;

pub mod classify;
pub mod config;
pub mod docx;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod secrets;
pub mod template;

pub use classify::{Classification, Classifier};
pub use config::{load_config, Config, JHA_MIME_TYPE};
pub use error::{ConfigError, DocxError, JhagenError, Result};
pub use pipeline::{
    ConvertConfig, ConvertContext, ConvertError, ConvertOutcome, Converter, ProgressReporter,
};
pub use secrets::{resolve_api_key, SecretError};

/// One-shot conversion: resolves the credential, wires up the production
/// classifier, runs the pipeline, and returns the generated document
/// bytes.
pub fn convert_mop(
    mop_bytes: Vec<u8>,
    config: &Config,
    progress: &dyn ProgressReporter,
) -> Result<Vec<u8>> {
    let api_key = resolve_api_key(
        config.api_key.as_deref(),
        config.api_key_file.as_deref(),
        config.api_key_env_var.as_deref(),
    )?;

    let classifier = classify::openai::OpenAiClassifier::new(
        api_key,
        config.api_base_url.clone(),
        config.model.clone(),
    );

    let converter = Converter::new(
        Arc::new(ConvertConfig::from_config(config)),
        Box::new(classifier),
    );

    let (result, mut ctx) = converter.run(ConvertContext::new(mop_bytes), progress);
    result.map_err(JhagenError::Convert)?;
    Ok(ctx.output.take().expect("output set on success"))
}
