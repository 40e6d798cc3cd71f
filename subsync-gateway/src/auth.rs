//! Credential seam.
//!
//! The OAuth acquisition/refresh flow lives outside this crate; the gateway
//! only needs a valid bearer credential on demand. Providers refresh
//! silently or fail with `AuthRequired`.

use crate::error::GatewayError;

/// A bearer credential accepted by the platform.
#[derive(Debug, Clone)]
pub struct Credential {
    pub bearer_token: String,
}

/// Supplies a valid credential on demand.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Result<Credential, GatewayError>;
}

/// A static, pre-acquired bearer token (from a token file or environment).
#[derive(Debug, Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for BearerToken {
    fn credential(&self) -> Result<Credential, GatewayError> {
        if self.0.trim().is_empty() {
            return Err(GatewayError::AuthRequired(
                "empty bearer token".to_string(),
            ));
        }
        Ok(Credential {
            bearer_token: self.0.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_is_returned() {
        let provider = BearerToken::new("ya29.token");
        assert_eq!(provider.credential().unwrap().bearer_token, "ya29.token");
    }

    #[test]
    fn empty_token_is_auth_required() {
        let provider = BearerToken::new("  ");
        assert!(matches!(
            provider.credential(),
            Err(GatewayError::AuthRequired(_))
        ));
    }
}
