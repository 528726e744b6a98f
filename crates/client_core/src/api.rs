use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode};
use shared::{
    domain::{PageQuery, PageResult, Product, ProductDraft, ProductId},
    protocol::{product_route, products_route, ListProductsResponse, ProductEcho, ProductEnvelope},
};
use tracing::debug;
use url::Url;

use crate::error::{Result, StoreError};

/// The remote catalog as seen by the store.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list(&self, query: &PageQuery) -> Result<PageResult>;
    async fn show(&self, id: ProductId) -> Result<Product>;
    /// Returns the echoed product when the server sends one back.
    async fn create(&self, draft: &ProductDraft) -> Result<Option<Product>>;
    async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Option<Product>>;
    async fn delete(&self, id: ProductId) -> Result<()>;
}

pub struct HttpProductApi {
    http: Client,
    api_url: String,
}

impl HttpProductApi {
    pub fn new(api_url: &str) -> std::result::Result<Self, url::ParseError> {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(http: Client, api_url: &str) -> std::result::Result<Self, url::ParseError> {
        let parsed = Url::parse(api_url.trim())?;
        Ok(Self {
            http,
            api_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    async fn execute(&self, request: RequestBuilder, id: Option<ProductId>) -> Result<Vec<u8>> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(StoreError::NetworkFailure)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(StoreError::NetworkFailure)?;

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound(id));
            }
        }
        if !status.is_success() {
            return Err(StoreError::rejected(
                status,
                &String::from_utf8_lossy(&body),
            ));
        }
        Ok(body.to_vec())
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| StoreError::InvalidResponse(err.to_string()))
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list(&self, query: &PageQuery) -> Result<PageResult> {
        let pairs = query.to_query_pairs();
        debug!("catalog api: GET /{} query={pairs:?}", products_route());
        let body = self
            .execute(
                self.http.get(self.endpoint(products_route())).query(&pairs),
                None,
            )
            .await?;
        Ok(decode::<ListProductsResponse>(&body)?.into())
    }

    async fn show(&self, id: ProductId) -> Result<Product> {
        debug!("catalog api: GET /{}", product_route(id));
        let body = self
            .execute(self.http.get(self.endpoint(&product_route(id))), Some(id))
            .await?;
        Ok(decode::<ProductEnvelope>(&body)?.data)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Option<Product>> {
        debug!("catalog api: POST /{} name={}", products_route(), draft.name);
        let body = self
            .execute(
                self.http.post(self.endpoint(products_route())).json(draft),
                None,
            )
            .await?;
        Ok(ProductEcho::parse(&body))
    }

    async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Option<Product>> {
        debug!("catalog api: PUT /{}", product_route(id));
        let body = self
            .execute(
                self.http.put(self.endpoint(&product_route(id))).json(draft),
                Some(id),
            )
            .await?;
        Ok(ProductEcho::parse(&body))
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        debug!("catalog api: DELETE /{}", product_route(id));
        self.execute(self.http.delete(self.endpoint(&product_route(id))), Some(id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
