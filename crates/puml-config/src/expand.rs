//! `${VAR}` expansion for string values in `puml.toml`.
//!
//! - `${VAR}` is replaced by the value of VAR; an unset VAR is an error
//! - `${VAR:-fallback}` uses the fallback when VAR is unset
//!
//! A value without any `${` is returned untouched, so a bare `$` in a plain
//! path survives. Once a value contains `${`, bare `$VAR` references in it
//! are expanded too and must be set.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` names the config key being expanded and is only used for error
/// reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, |name| {
        std::env::var(name).map(Some).map_err(|_| UnsetVar {
            name: name.to_owned(),
        })
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })?;

    Ok(expanded.into_owned())
}

/// Lookup failure for a referenced variable.
struct UnsetVar {
    name: String,
}
