use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use encoding_rs::Encoding;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::hocon;
use crate::{TransformConfig, FILE_NAMES_KEY};

/// Variable a context file is bound to when no `--var` is left for it.
pub const DEFAULT_VARIABLE: &str = "in";

pub type RenderContext = Map<String, Value>;

/// Builds the rendering context: `-D` literals first, then one binding per
/// context file in command line order, then the `fileNames` list.
pub fn build_context(config: &TransformConfig) -> Result<RenderContext> {
    let encoding = Encoding::for_label(config.charset.as_bytes())
        .ok_or_else(|| Error::msg(format!("Unsupported charset '{}'", config.charset)))?;

    let mut context: RenderContext = config
        .params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let variables = config
        .variables
        .iter()
        .map(String::as_str)
        .chain(iter::repeat(DEFAULT_VARIABLE));

    let mut file_names = Vec::with_capacity(config.files.len());
    for (file, variable) in config.files.iter().zip(variables) {
        let path = expand_home(file);
        debug!("loading context file {:?} as '{}'", path, variable);
        let text = read_text(&path, encoding)
            .with_context(|| format!("Failed to read context file '{}'", file))?;
        file_names.push(Value::String(base_name(file)));

        let value = if config.structured && hocon::is_structured(file) {
            hocon::parse_structured(file, &text)
                .with_context(|| format!("Failed to parse context file '{}'", file))?
        } else {
            Value::String(text)
        };
        if context.insert(variable.to_string(), value).is_some() {
            debug!("'{}' overwritten by context file '{}'", variable, file);
        }
    }

    context.insert(FILE_NAMES_KEY.to_string(), Value::Array(file_names));
    trace!("rendering context: {:?}", context);
    Ok(context)
}

/// File name without its directory and last extension: `conf/app.tar.gz` -> `app.tar`.
pub fn base_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn expand_home(file: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(file).into_owned())
}

fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path)?;
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::msg(format!("Malformed {} input in {:?}", encoding.name(), path)))
}
