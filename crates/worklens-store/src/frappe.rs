//! REST-backed store for Frappe-style backends
//!
//! Speaks the `GET /api/resource/{doctype}` listing protocol: projected
//! fields and filter triples are passed as JSON-encoded query
//! parameters, authentication is a `token key:secret` header. Reports
//! only read, so this client implements nothing else.

use crate::error::StoreError;
use crate::filter::FilterValue;
use crate::store::{ListQuery, RecordStore};
use async_trait::async_trait;

/// Environment variable holding the backend base URL.
pub const ENV_URL: &str = "FRAPPE_URL";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "FRAPPE_API_KEY";
/// Environment variable holding the API secret.
pub const ENV_API_SECRET: &str = "FRAPPE_API_SECRET";

/// Connection settings for [`FrappeClient`].
#[derive(Debug, Clone)]
pub struct FrappeConfig {
    /// Backend base URL, no trailing slash required.
    pub base_url: String,
    /// API key half of the token pair.
    pub api_key: String,
    /// API secret half of the token pair.
    pub api_secret: String,
}

impl FrappeConfig {
    /// Build a config, rejecting empty fields.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let config = Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        };
        if config.base_url.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(StoreError::Config(format!(
                "{ENV_URL}, {ENV_API_KEY} and {ENV_API_SECRET} must all be non-empty"
            )));
        }
        Ok(config)
    }

    /// Read the config from the environment.
    ///
    /// # Errors
    /// `StoreError::Config` naming the missing variables. This is the
    /// fatal configuration error of the report contract: it surfaces
    /// before any fetch and produces no partial output.
    pub fn from_env() -> Result<Self, StoreError> {
        let missing: Vec<&str> = [ENV_URL, ENV_API_KEY, ENV_API_SECRET]
            .into_iter()
            .filter(|var| std::env::var(var).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Config(format!(
                "missing environment: {}",
                missing.join(", ")
            )));
        }
        Self::new(
            std::env::var(ENV_URL).unwrap_or_default(),
            std::env::var(ENV_API_KEY).unwrap_or_default(),
            std::env::var(ENV_API_SECRET).unwrap_or_default(),
        )
    }

    fn token(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }
}

/// [`RecordStore`] implementation over the Frappe REST listing API.
#[derive(Debug, Clone)]
pub struct FrappeClient {
    config: FrappeConfig,
    http: reqwest::Client,
}

impl FrappeClient {
    /// Create a client from a validated config.
    #[must_use]
    pub fn new(config: FrappeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self::new(FrappeConfig::from_env()?))
    }

    fn resource_url(&self, doctype: &str) -> String {
        format!("{}/api/resource/{doctype}", self.config.base_url)
    }

    fn encode_filters(query: &ListQuery) -> serde_json::Value {
        let triples: Vec<serde_json::Value> = query
            .filters
            .iter()
            .map(|f| {
                let value = match &f.value {
                    FilterValue::Str(s) => serde_json::Value::String(s.clone()),
                    FilterValue::List(items) => serde_json::Value::Array(
                        items
                            .iter()
                            .map(|i| serde_json::Value::String(i.clone()))
                            .collect(),
                    ),
                };
                serde_json::json!([f.field, f.op.as_str(), value])
            })
            .collect();
        serde_json::Value::Array(triples)
    }
}

#[async_trait]
impl RecordStore for FrappeClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<serde_json::Value>, StoreError> {
        let fields = serde_json::to_string(&query.fields)
            .map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
        let filters = serde_json::to_string(&Self::encode_filters(query))
            .map_err(|e| StoreError::InvalidQuery(e.to_string()))?;

        let mut request = self
            .http
            .get(self.resource_url(query.kind.doctype()))
            .header("Authorization", self.config.token())
            .query(&[
                ("fields", fields.as_str()),
                ("filters", filters.as_str()),
                ("limit_page_length", &query.limit.to_string()),
            ]);
        if let Some(order) = &query.order_by {
            request = request.query(&[(
                "order_by",
                format!("{} {}", order.field, order.order.as_str()),
            )]);
        }

        tracing::debug!(kind = %query.kind, filters = %filters, "listing records");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(kind = %query.kind, status = status.as_u16(), "store request failed");
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        #[derive(serde::Deserialize)]
        struct Listing {
            #[serde(default)]
            data: Vec<serde_json::Value>,
        }
        let listing: Listing = response.json().await?;
        Ok(listing.data)
    }
}
