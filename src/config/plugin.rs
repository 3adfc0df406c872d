use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::errors::ConfigError;
use crate::utils::constants::{METHOD_GET, METHOD_POST, METHOD_PUT};

/// ================================
/// Plugin configuration, delivered by the host on initialization
/// ================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct PluginConfig {
    /// token endpoint
    #[serde(default)]
    pub url: String,
    /// GET, POST, PUT or anything else (sent with a JSON body)
    #[serde(default)]
    pub method: String,
    /// operator opt-in for self-signed endpoints, never on by default
    #[serde(default, rename = "tlsskipverify")]
    pub tls_skip_verify: bool,
    #[serde(default, rename = "refreshanticipationinmillisecond")]
    pub refresh_anticipation_in_millisecond: i32,
    /// parameter name -> value template, `${PSI}` is substituted per call
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// How the resolved parameters travel to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    /// multipart/form-data body (POST, PUT)
    Form,
    /// URL query string, no body (GET)
    Query,
    /// flat JSON object body (any other method)
    Json,
}

impl PluginConfig {
    /// Decode raw configuration bytes and validate them.
    ///
    /// Top-level keys are matched without regard to case and unknown keys are
    /// ignored. Parameter names keep their case.
    pub fn from_raw(raw: &[u8]) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| {
            error!("parse plugin config error: {}", e);
            ConfigError::InvalidConfig(format!("malformed JSON: {}", e))
        })?;

        let config: PluginConfig = serde_json::from_value(lowercase_keys(value)?)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        config.validate()?;
        debug!(
            url = %config.url,
            method = %config.method,
            parameters = config.parameters.len(),
            "plugin config accepted"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::InvalidConfig("url must be provided".to_owned()));
        }
        if self.method.is_empty() {
            return Err(ConfigError::InvalidConfig("method must be provided".to_owned()));
        }
        Ok(())
    }

    /// Anticipation window, negative values count as zero.
    pub fn anticipation_window(&self) -> Duration {
        Duration::from_millis(self.anticipation_millis() as u64)
    }

    pub fn anticipation_millis(&self) -> i32 {
        self.refresh_anticipation_in_millisecond.max(0)
    }

    /// Method names are matched exactly, so `post` falls through to JSON.
    pub fn encoding(&self) -> RequestEncoding {
        match self.method.as_str() {
            METHOD_POST | METHOD_PUT => RequestEncoding::Form,
            METHOD_GET => RequestEncoding::Query,
            _ => RequestEncoding::Json,
        }
    }
}

fn lowercase_keys(value: Value) -> Result<Value, ConfigError> {
    match value {
        Value::Object(map) => Ok(Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect::<Map<String, Value>>(),
        )),
        other => Err(ConfigError::InvalidConfig(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lowercase_keys() {
        let raw = br#"{
            "tlsskipverify":true,
            "url":"url",
            "method":"method",
            "refreshanticipationinmillisecond":1001,
            "parameters":{"test":"test"}
        }"#;
        let cfg = PluginConfig::from_raw(raw).unwrap();

        assert!(cfg.tls_skip_verify);
        assert_eq!(cfg.url, "url");
        assert_eq!(cfg.method, "method");
        assert_eq!(cfg.refresh_anticipation_in_millisecond, 1001);
        assert_eq!(
            cfg.parameters,
            BTreeMap::from([("test".to_owned(), "test".to_owned())])
        );
    }

    #[test]
    fn key_matching_ignores_case_but_parameter_names_do_not() {
        let raw = br#"{
            "URL":"https://idp.local/oauth2/token",
            "Method":"POST",
            "TLSSkipVerify":false,
            "RefreshAnticipationInMillisecond":250,
            "Parameters":{"Client_Id":"${PSI}"},
            "somethingElse":42
        }"#;
        let cfg = PluginConfig::from_raw(raw).unwrap();

        assert_eq!(cfg.url, "https://idp.local/oauth2/token");
        assert_eq!(cfg.method, "POST");
        assert_eq!(cfg.refresh_anticipation_in_millisecond, 250);
        assert_eq!(cfg.parameters.get("Client_Id").map(String::as_str), Some("${PSI}"));
    }

    #[test]
    fn defaults_apply_to_optional_fields() {
        let cfg = PluginConfig::from_raw(br#"{"url":"u","method":"GET"}"#).unwrap();
        assert!(!cfg.tls_skip_verify);
        assert_eq!(cfg.refresh_anticipation_in_millisecond, 0);
        assert!(cfg.parameters.is_empty());
    }

    #[test]
    fn encode_then_decode_yields_equal_value() {
        let cfg = PluginConfig {
            url: "https://idp.local/token".to_owned(),
            method: "PUT".to_owned(),
            tls_skip_verify: true,
            refresh_anticipation_in_millisecond: 30_000,
            parameters: BTreeMap::from([
                ("client_id".to_owned(), "${PSI}".to_owned()),
                ("scope".to_owned(), "psi://${PSI}?self.eoa=0x0".to_owned()),
            ]),
        };
        let encoded = serde_json::to_vec(&cfg).unwrap();
        assert_eq!(PluginConfig::from_raw(&encoded).unwrap(), cfg);
    }

    #[test]
    fn empty_url_or_method_is_rejected() {
        let err = PluginConfig::from_raw(br#"{"url":"","method":"POST"}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfig("url must be provided".to_owned()));

        let err = PluginConfig::from_raw(br#"{"url":"https://idp"}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidConfig("method must be provided".to_owned()));
    }

    #[test]
    fn malformed_payload_is_invalid_config() {
        assert!(matches!(
            PluginConfig::from_raw(b"not json"),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            PluginConfig::from_raw(b"[1,2]"),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            PluginConfig::from_raw(br#"{"url":"u","method":"GET","refreshanticipationinmillisecond":"soon"}"#),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_anticipation_counts_as_zero() {
        let cfg = PluginConfig {
            refresh_anticipation_in_millisecond: -5,
            ..Default::default()
        };
        assert_eq!(cfg.anticipation_millis(), 0);
        assert_eq!(cfg.anticipation_window(), Duration::ZERO);
    }

    #[test]
    fn encoding_follows_method() {
        let with_method = |method: &str| PluginConfig {
            method: method.to_owned(),
            ..Default::default()
        };
        assert_eq!(with_method("POST").encoding(), RequestEncoding::Form);
        assert_eq!(with_method("PUT").encoding(), RequestEncoding::Form);
        assert_eq!(with_method("GET").encoding(), RequestEncoding::Query);
        assert_eq!(with_method("put").encoding(), RequestEncoding::Json);
        assert_eq!(with_method("post").encoding(), RequestEncoding::Json);
        assert_eq!(with_method("Get").encoding(), RequestEncoding::Json);
        assert_eq!(with_method("PATCH").encoding(), RequestEncoding::Json);
        assert_eq!(with_method("method").encoding(), RequestEncoding::Json);
    }
}
