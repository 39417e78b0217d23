//! Request DTOs for the shortener API
//!
//! Defines the structure of incoming HTTP request bodies, including the
//! duration-literal parser for expiry specs.

use serde::Deserialize;

use crate::registry::MAX_URL_LENGTH;

/// Request body for the create operation (POST /create)
///
/// # Fields
/// - `url`: The long URL to shorten
/// - `expiry`: Optional duration literal, e.g. `"10s"`, `"5m"`, `"-1s"`.
///   Absent means `"0"`, which gives the default one-year lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// The long URL to shorten
    pub url: String,
    /// Optional expiry duration literal
    #[serde(default)]
    pub expiry: Option<String>,
}

impl CreateRequest {
    /// Validates the request and returns the ttl in whole seconds.
    ///
    /// Malformed input is a caller-side validation error, reported before
    /// the registry is ever involved.
    pub fn validate(&self) -> Result<i64, String> {
        if self.url.is_empty() {
            return Err("url must not be empty".to_string());
        }
        if self.url.len() > MAX_URL_LENGTH {
            return Err(format!("url exceeds maximum length of {MAX_URL_LENGTH} bytes"));
        }
        match self.expiry.as_deref() {
            Some(spec) => parse_ttl(spec),
            None => Ok(0),
        }
    }
}

// == Duration Literals ==
/// Parses a duration literal into whole seconds.
///
/// Accepts a bare `"0"` or a signed integer with an `s`/`m`/`h`/`d` suffix.
/// Negative values are legal and mean "already expired".
pub fn parse_ttl(spec: &str) -> Result<i64, String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err("expiry must not be empty".to_string());
    }
    if spec == "0" {
        return Ok(0);
    }

    let unit = spec.chars().last().unwrap_or_default();
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86_400,
        _ => return Err(format!("unknown duration unit '{unit}' in '{spec}'")),
    };

    let number = &spec[..spec.len() - unit.len_utf8()];
    let value: i64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{spec}'"))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration '{spec}' out of range"))
}
