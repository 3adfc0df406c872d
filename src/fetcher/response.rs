use serde::Deserialize;

use crate::errors::RefreshError;
use crate::utils::constants::SCHEME_LABEL;

/// Token endpoint response body
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ProviderResponse {
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, RefreshError> {
        serde_json::from_slice(body).map_err(|e| RefreshError::Decode {
            status,
            message: e.to_string(),
        })
    }

    /// Scheme-labelled token, or the provider's own rejection.
    pub fn into_token(self, status: u16) -> Result<String, RefreshError> {
        if let Some(code) = self.error.filter(|code| !code.is_empty()) {
            return Err(RefreshError::Provider {
                code,
                description: self.error_description.unwrap_or_default(),
            });
        }
        let access_token = self.access_token.ok_or_else(|| RefreshError::Decode {
            status,
            message: "missing field `access_token`".to_owned(),
        })?;
        Ok(format!("{} {}", SCHEME_LABEL, access_token))
    }
}
