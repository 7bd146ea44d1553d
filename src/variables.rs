use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{RepvarError, Result};
use crate::report::Warning;

/// Variable names mapped to their replacement values.
///
/// Values are JSON scalars. Strings are the normal case; other scalars are
/// accepted at load time and handled by the resolver.
pub type VariableMap = BTreeMap<String, Value>;

/// Default name of the variables document inside the input folder.
pub const DEFAULT_VARIABLES_FILE: &str = "variables.json";

pub struct LoadedVariables {
    pub variables: VariableMap,
    pub warnings: Vec<Warning>,
}

/// Load a flat JSON object of variables from `path`.
pub fn load_variables(path: &Path) -> Result<LoadedVariables> {
    if !path.is_file() {
        return Err(RepvarError::VariablesNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| RepvarError::VariablesRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_variables(path, &content)
}

fn parse_variables(path: &Path, content: &str) -> Result<LoadedVariables> {
    let raw: Value = serde_json::from_str(content).map_err(|e| RepvarError::VariablesParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let Value::Object(obj) = raw else {
        return Err(RepvarError::VariablesShape {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", json_kind(&raw)),
        });
    };

    let mut variables = VariableMap::new();
    let mut warnings = Vec::new();

    for (name, value) in obj {
        if value.is_object() || value.is_array() {
            return Err(RepvarError::VariablesShape {
                path: path.to_path_buf(),
                reason: format!(
                    "variable '{name}' is {}, only scalar values are allowed",
                    json_kind(&value)
                ),
            });
        }

        // The token grammar splits on the first '-', so these can never be referenced.
        if name.is_empty() || name.contains('-') {
            warnings.push(Warning::UnreachableVariable { name: name.clone() });
        }

        variables.insert(name, value);
    }

    Ok(LoadedVariables {
        variables,
        warnings,
    })
}

/// Parse `key=value` pairs given on the command line.
pub fn parse_overrides(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|kv| {
            kv.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| RepvarError::InvalidOverride { input: kv.clone() })
        })
        .collect()
}

/// Merge overrides on top of loaded variables. Later pairs win.
pub fn apply_overrides(variables: &mut VariableMap, overrides: Vec<(String, String)>) {
    for (key, value) in overrides {
        variables.insert(key, Value::String(value));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
