//! JSON ↔ env-file conversion.

use std::path::Path;

use serde_json::{Map, Value};

use super::format::{self, EnvVars};
use super::EnvFileError;

/// Target of a conversion, chosen from the input's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    JsonToEnv,
    EnvToJson,
}

impl Conversion {
    /// `*.json` converts to env; `.env`, `.env.*` and `*.env` convert to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EnvFileError::UnsupportedExtension`] for anything else.
    pub fn detect(path: &Path) -> Result<Self, EnvFileError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        if ext.eq_ignore_ascii_case("json") {
            Ok(Conversion::JsonToEnv)
        } else if name == ".env" || name.starts_with(".env.") || ext == "env" {
            Ok(Conversion::EnvToJson)
        } else {
            Err(EnvFileError::UnsupportedExtension(
                if ext.is_empty() { name } else { ext }.to_owned(),
            ))
        }
    }
}

/// Convert the file at `input`, applying `prefix` and `suffix` to every name.
///
/// # Errors
///
/// Returns [`EnvFileError::UnsupportedExtension`] for unknown inputs and
/// [`EnvFileError::InvalidJson`] if a JSON input is not an object.
pub fn convert_file(input: &Path, prefix: &str, suffix: &str) -> Result<String, EnvFileError> {
    let conversion = Conversion::detect(input)?;
    let text = super::read(input)?;
    match conversion {
        Conversion::JsonToEnv => json_to_env(&text, prefix, suffix),
        Conversion::EnvToJson => Ok(env_to_json(&format::parse(&text), prefix, suffix)),
    }
}

/// `{"k": v}` → `PREFIXkSUFFIX='v'` lines.
///
/// # Errors
///
/// Returns [`EnvFileError::InvalidJson`] if `json` is not an object.
pub fn json_to_env(json: &str, prefix: &str, suffix: &str) -> Result<String, EnvFileError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| EnvFileError::InvalidJson(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(EnvFileError::InvalidJson("expected a JSON object".into()));
    };

    let mut out = String::new();
    for (key, value) in &map {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push_str(&format!("{prefix}{key}{suffix}='{rendered}'\n"));
    }
    Ok(out)
}

/// Env vars → pretty JSON object of strings.
pub fn env_to_json(vars: &EnvVars, prefix: &str, suffix: &str) -> String {
    let map: Map<String, Value> = vars
        .iter()
        .map(|(k, v)| (format!("{prefix}{k}{suffix}"), Value::String(v.to_owned())))
        .collect();
    let mut out = serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default();
    out.push('\n');
    out
}
