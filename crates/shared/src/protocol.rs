use serde::{Deserialize, Serialize};

use crate::domain::{PageResult, PaginationMeta, Product};

/// Body of `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProductsResponse {
    pub data: Vec<Product>,
    pub meta: PaginationMeta,
}

impl From<ListProductsResponse> for PageResult {
    fn from(value: ListProductsResponse) -> Self {
        Self {
            items: value.data,
            meta: value.meta,
        }
    }
}

/// Body of `GET /products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEnvelope {
    pub data: Product,
}

/// Body of create and update responses. Servers differ on whether they wrap
/// the echoed product, and some echo nothing useful at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductEcho {
    Wrapped(ProductEnvelope),
    Bare(Product),
}

impl ProductEcho {
    pub fn into_product(self) -> Product {
        match self {
            ProductEcho::Wrapped(envelope) => envelope.data,
            ProductEcho::Bare(product) => product,
        }
    }

    /// Decodes an echo body, yielding `None` for empty or unrecognized shapes.
    pub fn parse(body: &[u8]) -> Option<Product> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        serde_json::from_slice::<ProductEcho>(body)
            .ok()
            .map(ProductEcho::into_product)
    }
}

pub fn products_route() -> &'static str {
    "products"
}

pub fn product_route(id: crate::domain::ProductId) -> String {
    format!("products/{}", id.0)
}
