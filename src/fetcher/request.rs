use std::collections::BTreeMap;

use http::Method;
use reqwest::{multipart::Form, Client, RequestBuilder, Url};

use crate::config::plugin::{PluginConfig, RequestEncoding};
use crate::errors::RefreshError;
use crate::utils::constants::PSI_PLACEHOLDER;

/// A token request resolved for one PSI, ready to be turned into a reqwest call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub method: Method,
    pub url: Url,
    pub encoding: RequestEncoding,
    pub parameters: BTreeMap<String, String>,
}

impl TokenRequest {
    pub fn resolve(config: &PluginConfig, psi: &str) -> Result<Self, RefreshError> {
        let encoding = config.encoding();
        let method = Method::from_bytes(config.method.as_bytes())
            .map_err(|e| RefreshError::Config(format!("method '{}': {}", config.method, e)))?;

        let url = Url::parse(&config.url)
            .map_err(|e| RefreshError::Config(format!("url '{}': {}", config.url, e)))?;

        Ok(Self {
            method,
            url,
            encoding,
            parameters: resolve_parameters(&config.parameters, psi),
        })
    }

    pub fn into_request_builder(self, client: &Client) -> Result<RequestBuilder, RefreshError> {
        let builder = client.request(self.method, self.url);
        let builder = match self.encoding {
            RequestEncoding::Form => {
                let form = self
                    .parameters
                    .into_iter()
                    .fold(Form::new(), |form, (key, value)| form.text(key, value));
                builder.multipart(form)
            }
            RequestEncoding::Query => builder.query(&self.parameters),
            // content type is left to the transport
            RequestEncoding::Json => {
                let body = serde_json::to_vec(&self.parameters)
                    .map_err(|e| RefreshError::Config(e.to_string()))?;
                builder.body(body)
            }
        };
        Ok(builder)
    }
}

/// Substitutes every `${PSI}` occurrence in every template, verbatim.
pub fn resolve_parameters(
    templates: &BTreeMap<String, String>,
    psi: &str,
) -> BTreeMap<String, String> {
    templates
        .iter()
        .map(|(key, template)| (key.to_owned(), template.replace(PSI_PLACEHOLDER, psi)))
        .collect()
}
