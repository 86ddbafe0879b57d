use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::fetch::Backend;
use crate::query::Query;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// [`Backend`] over plain HTTP GET requests against the dashboard API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DashboardError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, query: &Query) -> String {
        format!("{}{}", self.base_url, query.route())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(&self, query: &Query) -> Result<Value> {
        let url = self.url_for(query);
        debug!("GET {} {:?}", url, query.params);

        let res = self
            .client
            .get(&url)
            .query(&query.params)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DashboardError::HttpStatus {
                endpoint: query.route().to_string(),
                status: status.as_u16(),
            });
        }

        Ok(res.json().await?)
    }
}
