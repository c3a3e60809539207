//! JSON Schema validation for plugin configuration.

use serde_json::Value;

/// Validate `instance` against `schema`.
///
/// Returns every violation message (empty when valid), or `Err` with the
/// compiler message when the schema itself is malformed.
pub fn violations(schema: &Value, instance: &Value) -> Result<Vec<String>, String> {
    let validator = jsonschema::validator_for(schema).map_err(|e| e.to_string())?;
    Ok(validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect())
}
