//! Backend API client stub.
//!
//! Boundary for a future real backend: a generic request/response wrapper
//! plus the AI-service helpers the conversation and registry stores could
//! call in place of their mock logic. No store calls it today; the runtime
//! only constructs it when a base URL is configured.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Standard response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint_url(endpoint))
            .send()
            .await
            .with_context(|| format!("GET {endpoint} failed"))?;
        Self::parse(response, endpoint).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint_url(endpoint))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {endpoint} failed"))?;
        Self::parse(response, endpoint).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let response = self
            .client
            .put(self.endpoint_url(endpoint))
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {endpoint} failed"))?;
        Self::parse(response, endpoint).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self
            .client
            .delete(self.endpoint_url(endpoint))
            .send()
            .await
            .with_context(|| format!("DELETE {endpoint} failed"))?;
        Self::parse(response, endpoint).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, endpoint: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{endpoint} returned {status}: {body}");
        }
        response
            .json()
            .await
            .with_context(|| format!("failed to parse response from {endpoint}"))
    }

    // ===== AI-service helpers =====

    pub async fn send_message_to_ai(
        &self,
        service_id: &str,
        message: &str,
        context: Option<serde_json::Value>,
    ) -> Result<ApiResponse<ChatReply>> {
        let body = serde_json::json!({ "message": message, "context": context });
        self.post(&format!("/ai/{service_id}/chat"), &body).await
    }

    pub async fn service_status(&self, service_id: &str) -> Result<ApiResponse<ServiceStatus>> {
        self.get(&format!("/ai/{service_id}/status")).await
    }

    pub async fn connect_service(
        &self,
        service_id: &str,
        credentials: serde_json::Value,
    ) -> Result<ApiResponse<serde_json::Value>> {
        self.post(&format!("/ai/{service_id}/connect"), &credentials)
            .await
    }

    pub async fn disconnect_service(
        &self,
        service_id: &str,
    ) -> Result<ApiResponse<serde_json::Value>> {
        self.delete(&format!("/ai/{service_id}/disconnect")).await
    }
}
