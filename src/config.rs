use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CERT_BASE_URL not set")]
    MissingBaseUrl,
}

/// Where verification links point. The original frontend read the browser
/// origin; here the base URL is injected so the crate runs anywhere.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    pub base_url: String,
}

impl VerificationConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Convenience loader for service contexts: reads `CERT_BASE_URL`
    /// after picking up a `.env` file if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let url = env::var("CERT_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        Ok(Self::new(url))
    }

    pub fn verification_url(&self, certificate_id: &str) -> String {
        format!("{}/verify/{}", self.base_url, certificate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let config = VerificationConfig::new("https://learn.example.com/");
        assert_eq!(config.base_url, "https://learn.example.com");
        assert_eq!(
            config.verification_url("CERT-X-ABC123"),
            "https://learn.example.com/verify/CERT-X-ABC123"
        );
    }
}
