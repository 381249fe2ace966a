//! HTTP client for the `/api/v1/products` resource.
//!
//! Wraps the REST API using [`reqwest`] and unwraps the
//! `{ success, data, message }` envelope.

use async_trait::async_trait;
use inventory_core::filter::ProductQuery;
use inventory_core::product::{NewProduct, Product, ProductPatch};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Errors from the client API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a failure envelope or a non-2xx status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },
}

impl ClientError {
    /// The server-supplied failure message, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            ClientError::Request(_) => None,
        }
    }
}

/// Operations the dashboard needs from the product service.
#[async_trait]
pub trait ProductBackend: Send + Sync + 'static {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError>;

    async fn create_product(&self, input: &NewProduct) -> Result<Product, ClientError>;

    async fn update_product(&self, id: &str, patch: &ProductPatch)
        -> Result<Product, ClientError>;

    async fn delete_product(&self, id: &str) -> Result<(), ClientError>;
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// HTTP client for one inventory service instance.
#[derive(Debug, Clone)]
pub struct ProductsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProductsClient {
    /// Create a client for a service root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    /// `GET /products/{id}`.
    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/products/{id}")))
            .send()
            .await?;
        let (status, envelope) = Self::read_envelope::<Product>(response).await?;
        envelope.data.ok_or(ClientError::Api {
            status,
            message: envelope.message,
        })
    }

    // ---- private helpers ----

    /// Decode the envelope, turning failure statuses and `success: false`
    /// into [`ClientError::Api`].
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<(u16, Envelope<T>), ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Envelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|e| e.message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = response.json::<Envelope<T>>().await?;
        if !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok((status.as_u16(), envelope))
    }

    async fn expect_data<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let (status, envelope) = Self::read_envelope::<T>(response).await?;
        envelope.data.ok_or(ClientError::Api {
            status,
            message: Some("response carried no data".to_string()),
        })
    }
}

#[async_trait]
impl ProductBackend for ProductsClient {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError> {
        let response = self
            .client
            .get(self.url("/products"))
            .query(query)
            .send()
            .await?;
        let (_, envelope) = Self::read_envelope::<Vec<Product>>(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, ClientError> {
        let response = self
            .client
            .post(self.url("/products"))
            .json(input)
            .send()
            .await?;
        Self::expect_data(response).await
    }

    async fn update_product(
        &self,
        id: &str,
        patch: &ProductPatch,
    ) -> Result<Product, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/products/{id}")))
            .json(patch)
            .send()
            .await?;
        Self::expect_data(response).await
    }

    async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/products/{id}")))
            .send()
            .await?;
        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}
