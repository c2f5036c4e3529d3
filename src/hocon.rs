use std::path::Path;

use anyhow::{Error, Result};
use hocon::{Hocon, HoconLoader};
use serde_json::{Number, Value};

const JSON_EXTENSIONS: [&str; 2] = ["json", "js"];
const HOCON_EXTENSIONS: [&str; 2] = ["conf", "hocon"];

fn extension(file: &str) -> Option<&str> {
    Path::new(file).extension().and_then(|e| e.to_str())
}

pub fn is_structured(file: &str) -> bool {
    extension(file)
        .map(|e| JSON_EXTENSIONS.contains(&e) || HOCON_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Parses already decoded file text into JSON, picking the format by extension.
pub fn parse_structured(file: &str, text: &str) -> Result<Value> {
    match extension(file) {
        Some(e) if HOCON_EXTENSIONS.contains(&e) => read_hocon(file, text),
        _ => Ok(serde_json::from_str(text)?),
    }
}

fn read_hocon(file: &str, text: &str) -> Result<Value> {
    let hocon = HoconLoader::new().load_str(text)?.hocon()?;
    hocon_to_json(hocon).ok_or_else(|| {
        Error::msg(format!(
            "Failed to convert config file '{}' to JSON format",
            file
        ))
    })
}

fn hocon_to_json(hocon: Hocon) -> Option<Value> {
    match hocon {
        Hocon::Boolean(b) => Some(Value::Bool(b)),
        Hocon::Integer(i) => Some(Value::Number(Number::from(i))),
        Hocon::Real(f) => Some(Value::Number(
            Number::from_f64(f).unwrap_or_else(|| Number::from(0)),
        )),
        Hocon::String(s) => Some(Value::String(s)),
        Hocon::Array(vec) => Some(Value::Array(
            vec.into_iter().filter_map(hocon_to_json).collect(),
        )),
        Hocon::Hash(map) => Some(Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| hocon_to_json(v).map(|v| (k, v)))
                .collect(),
        )),
        Hocon::Null => Some(Value::Null),
        Hocon::BadValue(_) => None,
    }
}
