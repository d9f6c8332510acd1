//! API client for the house price service

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Header carrying the caller identity
pub const USER_HEADER: &str = "x-user-id";

/// API client for the house price service
pub struct ApiClient {
    client: Client,
    base_url: Url,
    user: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, user: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self {
            client,
            base_url,
            user,
        })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        let response = self.send(self.client.get(url)).await?;
        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        let response = self.send(self.client.post(url).json(body)).await?;
        response.json().await.context("Failed to parse response")
    }

    /// Make a DELETE request; the response body is ignored
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.base_url.join(path).context("Invalid path")?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.user {
            Some(user) => request.header(USER_HEADER, user),
            None => request,
        };

        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, describe_error(&body));
        }

        Ok(response)
    }
}

/// Render an error body, including per-field validation details
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if err.details.is_empty() => err.error,
        Ok(err) => {
            let details: Vec<String> = err
                .details
                .iter()
                .map(|d| format!("{}: {}", d.field, d.message))
                .collect();
            format!("{} ({})", err.error, details.join("; "))
        }
        Err(_) => body.to_string(),
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub stories: u32,
    pub parking: u32,
    pub mainroad: String,
    pub guestroom: String,
    pub basement: String,
    pub hotwaterheating: String,
    pub airconditioning: String,
    pub prefarea: String,
    pub furnishingstatus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: u64,
    pub user_id: String,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub predicted_price: f64,
    pub source: String,
    pub predicted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: PredictionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionPage {
    pub items: Vec<PredictionRecord>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_predictions: usize,
    pub avg_price: f64,
    pub max_price: f64,
    pub min_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: Option<String>,
    pub model_kind: String,
    pub training_date: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub features: Vec<String>,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub details: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
