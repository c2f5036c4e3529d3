use anyhow::Result;

pub use crate::context::{base_name, build_context, RenderContext, DEFAULT_VARIABLE};
pub use crate::validate::{validate, ValidationError};

pub const DEFAULT_CHARSET: &str = "UTF-8";
pub const FILE_NAMES_KEY: &str = "fileNames";

/// Everything one invocation needs, populated once from the command line.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub templates: Vec<String>,
    pub files: Vec<String>,
    pub variables: Vec<String>,
    pub charset: String,
    /// Literal `-D` parameters in command line order; later duplicates win.
    pub params: Vec<(String, String)>,
    /// Parse `json`/`js`/`conf`/`hocon` context files instead of binding raw text.
    pub structured: bool,
}

impl TransformConfig {
    pub fn new(templates: Vec<String>) -> Self {
        TransformConfig {
            templates,
            files: vec![],
            variables: vec![DEFAULT_VARIABLE.to_string()],
            charset: DEFAULT_CHARSET.to_string(),
            params: vec![],
            structured: false,
        }
    }
}

/// Validates the config, builds the context and renders every template into `out`.
///
/// Nothing is read from disk when validation fails, and nothing is written to
/// `out` until the whole context has been built.
pub fn transform<F: FnMut(&str) -> Result<()>>(config: &TransformConfig, out: F) -> Result<()> {
    validate(config)?;
    let context = build_context(config)?;
    render::render(config, &context, out)
}

mod context;
mod hocon;
pub mod render;
mod validate;
