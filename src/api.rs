use std::time::Duration;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::config::Config;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub product: String,
    pub question: String,
}

/// Answer to a chat question. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub data_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub product_a: String,
    pub product_b: String,
    pub specification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub specification: String,
    pub product_a_value: String,
    pub product_b_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub product_a_name: String,
    pub product_b_name: String,
    pub comparisons: Vec<ComparisonRow>,
    /// Set by the backend when one of the products could not be found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP client for the manuals backend. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct ManualsClient {
    client: Client,
    products_url: String,
    chat_url: String,
    compare_url: String,
}

impl ManualsClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            products_url: config.endpoint(&config.products_path),
            chat_url: config.endpoint(&config.chat_path),
            compare_url: config.endpoint(&config.compare_path),
        })
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let url = &self.products_url;
        tracing::debug!(%url, "fetching product catalog");
        send_json(url, self.client.get(url)).await
    }

    pub async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = &self.chat_url;
        tracing::info!(%url, product = %request.product, "sending question");
        send_json(url, self.client.post(url).json(request)).await
    }

    pub async fn compare(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResult, ClientError> {
        let url = &self.compare_url;
        tracing::info!(
            %url,
            product_a = %request.product_a,
            product_b = %request.product_b,
            specification = %request.specification,
            "requesting comparison"
        );
        send_json(url, self.client.post(url).json(request)).await
    }
}

async fn send_json<T: DeserializeOwned>(
    url: &str,
    request: RequestBuilder,
) -> Result<T, ClientError> {
    let transport = |source| ClientError::Transport {
        url: url.to_string(),
        source,
    };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let body = response.text().await.map_err(transport)?;

    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status,
            body,
        });
    }

    serde_json::from_str(&body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}
