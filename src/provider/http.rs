//! Thin JSON-over-HTTP client shared by the built-in providers.

use crate::{Error, ErrorContext, Result};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub(crate) struct RestClient {
    client: reqwest::Client,
    base: Url,
    bearer: Option<String>,
}

impl RestClient {
    pub(crate) fn new(
        base: &str,
        bearer: Option<String>,
        timeout: Duration,
        source: &'static str,
    ) -> Result<Self> {
        // A trailing slash makes `Url::join` append rather than replace the last segment.
        let normalized = format!("{}/", base.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new()
                    .with_details(base.to_string())
                    .with_source(source),
            )
        })?;

        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to create HTTP client: {}", e),
                ErrorContext::new().with_source(source),
            )
        })?;

        Ok(Self {
            client,
            base,
            bearer,
        })
    }

    pub(crate) fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path.trim_start_matches('/')).map_err(|e| {
            Error::runtime_with_context(
                format!("invalid request path: {}", e),
                ErrorContext::new().with_details(path.to_string()),
            )
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self
            .client
            .request(method, url.as_str())
            .header("Accept", "application/json");
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let builder = self.request(Method::GET, path)?.query(query);
        Self::send(builder).await
    }

    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let builder = self.request(Method::POST, path)?.json(body);
        Self::send(builder).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value> {
        let builder = self.request(Method::DELETE, path)?;
        Self::send(builder).await
    }

    async fn send(builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: remote_message(&body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Some endpoints answer with bare text; pass it through instead of failing.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

/// Pull a readable message out of an error body.
fn remote_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidate = json
            .pointer("/error/message")
            .or_else(|| json.get("error"))
            .or_else(|| json.get("message"));
        if let Some(Value::String(s)) = candidate {
            return s.clone();
        }
    }
    body.trim().to_string()
}
