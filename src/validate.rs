use encoding_rs::Encoding;
use thiserror::Error;

use crate::TransformConfig;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .messages.join("\n"))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// Checks the invocation before any file is touched and reports every problem at once.
pub fn validate(config: &TransformConfig) -> Result<(), ValidationError> {
    let mut messages = vec![];

    if config.templates.is_empty() {
        messages.push("template file is required".to_string());
    }

    if config.files.len() > config.variables.len() {
        messages.push(format!(
            "{} context file(s) given but only {} variable name(s)",
            config.files.len(),
            config.variables.len()
        ));
    }

    if Encoding::for_label(config.charset.as_bytes()).is_none() {
        messages.push(format!("unsupported charset '{}'", config.charset));
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { messages })
    }
}
