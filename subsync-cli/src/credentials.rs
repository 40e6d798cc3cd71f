//! Per-channel bearer credentials.
//!
//! The OAuth dance happens outside this tool; it only consumes the result:
//! a `token_<nickname>.json` file in the working directory (the shape the
//! platform's client libraries write), or a `SUBSYNC_TOKEN` environment
//! override for scripting.

use std::path::PathBuf;

use serde::Deserialize;

use subsync_gateway::{BearerToken, GatewayError};

/// Environment variable that bypasses the token file.
pub const TOKEN_ENV: &str = "SUBSYNC_TOKEN";

#[derive(Debug, Deserialize)]
struct TokenFile {
    /// Either field name works; client libraries disagree on the spelling.
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// Path of the token file for a channel nickname.
pub fn token_path(nickname: &str) -> PathBuf {
    PathBuf::from(format!("token_{nickname}.json"))
}

/// Load a bearer credential for `nickname`.
pub fn load(nickname: &str) -> Result<BearerToken, GatewayError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return Ok(BearerToken::new(token));
        }
    }

    let path = token_path(nickname);
    if !path.exists() {
        return Err(GatewayError::AuthRequired(format!(
            "no credential for channel '{nickname}': create {} or set {TOKEN_ENV}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| GatewayError::AuthRequired(format!("cannot read {}: {e}", path.display())))?;
    let parsed: TokenFile = serde_json::from_str(&contents)
        .map_err(|e| GatewayError::AuthRequired(format!("malformed {}: {e}", path.display())))?;

    parsed
        .access_token
        .or(parsed.token)
        .filter(|t| !t.trim().is_empty())
        .map(BearerToken::new)
        .ok_or_else(|| {
            GatewayError::AuthRequired(format!(
                "{} has no usable access token",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_path_is_per_nickname() {
        assert_eq!(token_path("main"), PathBuf::from("token_main.json"));
    }

    #[test]
    fn token_file_accepts_either_field_name() {
        let a: TokenFile = serde_json::from_str(r#"{"access_token": "x"}"#).unwrap();
        assert_eq!(a.access_token.as_deref(), Some("x"));
        let b: TokenFile = serde_json::from_str(r#"{"token": "y", "refresh_token": "z"}"#).unwrap();
        assert_eq!(b.token.as_deref(), Some("y"));
    }
}
