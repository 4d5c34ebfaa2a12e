//! HTTP client for the CKAN action API

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::catalog::Catalog;
use super::error::{CatalogError, CatalogErrorKind};
use super::models::{Lookup, Package};
use super::operations::Operation;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of a non-JSON response body kept in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// Process-wide handle to one CKAN instance
#[derive(Debug, Clone)]
pub struct CkanClient {
    base_url: String,
    http: reqwest::Client,
}

impl CkanClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key).map_err(|e| {
                CatalogError::new(CatalogErrorKind::Serialization, None, e.to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/api/3/action/{}", self.base_url, action)
    }

    /// Execute one action and unwrap the CKAN envelope
    pub async fn execute(&self, operation: &Operation) -> Result<Value, CatalogError> {
        let url = self.action_url(operation.action());
        debug!("POST {} ({})", url, operation.target());
        if operation.is_write() {
            trace!("{} body: {}", operation.action(), operation.body());
        }

        let response = self.http.post(&url).json(&operation.body()).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!("{} {} -> HTTP {}", operation.action(), operation.target(), status);
        parse_envelope(status, &text)
    }
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ActionError>,
}

#[derive(Debug, Deserialize)]
struct ActionError {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ActionError {
    /// CKAN validation errors carry per-field messages instead of `message`
    fn describe(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let details: Vec<String> = self
            .fields
            .iter()
            .map(|(field, value)| format!("{}: {}", field, flatten_messages(value)))
            .collect();
        if details.is_empty() {
            self.kind.clone().unwrap_or_else(|| "Unknown error".to_string())
        } else {
            details.join("; ")
        }
    }
}

fn flatten_messages(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_messages)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Turn an HTTP status and body into the action result or a classified error
pub(crate) fn parse_envelope(status: u16, body: &str) -> Result<Value, CatalogError> {
    let envelope: ActionResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
            let kind = if (200..300).contains(&status) {
                CatalogErrorKind::Serialization
            } else {
                CatalogError::classify(status, None)
            };
            return Err(CatalogError::new(
                kind,
                Some(status),
                format!("unexpected response (HTTP {}): {}", status, excerpt.trim()),
            ));
        }
    };

    if envelope.success {
        return Ok(envelope.result.unwrap_or(Value::Null));
    }

    match envelope.error {
        Some(error) => Err(CatalogError::new(
            CatalogError::classify(status, error.kind.as_deref()),
            Some(status),
            error.describe(),
        )),
        None => Err(CatalogError::new(
            CatalogError::classify(status, None),
            Some(status),
            format!("action failed with HTTP {}", status),
        )),
    }
}

#[async_trait]
impl Catalog for CkanClient {
    async fn package_show(&self, name: &str) -> Result<Lookup<Package>, CatalogError> {
        match self.execute(&Operation::show_package(name)).await {
            Ok(result) => Ok(Lookup::Found(serde_json::from_value(result)?)),
            Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn package_create(&self, package: &Package) -> Result<Package, CatalogError> {
        let result = self
            .execute(&Operation::create_package(package.clone()))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn package_update(&self, package: &Package) -> Result<Package, CatalogError> {
        let result = self
            .execute(&Operation::update_package(package.clone()))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn group_show(&self, id: &str) -> Result<Lookup<Value>, CatalogError> {
        match self.execute(&Operation::show_group(id)).await {
            Ok(result) => Ok(Lookup::Found(result)),
            Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }
}
