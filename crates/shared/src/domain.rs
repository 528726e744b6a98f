use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProductId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "price_from_number_or_string")]
    pub price: f64,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// True when the editable fields equal `draft`, ignoring server-assigned ones.
    pub fn matches_draft(&self, draft: &ProductDraft) -> bool {
        self.name == draft.name
            && self.description.as_deref().unwrap_or_default()
                == draft.description.as_deref().unwrap_or_default()
            && (self.price - draft.price).abs() < 1e-9
            && self.stock == draft.stock
    }
}

/// A product without its server-assigned fields; the body of create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "price_from_number_or_string")]
    pub price: f64,
    pub stock: u32,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Field checks a form should run before submitting.
    pub fn validate(&self) -> Result<(), Vec<DraftError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(DraftError::EmptyName);
        }
        if !self.price.is_finite() {
            errors.push(DraftError::PriceNotNumeric);
        } else if self.price < 0.0 {
            errors.push(DraftError::NegativePrice(self.price));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("price must be a number")]
    PriceNotNumeric,
    #[error("price must not be negative, got {0}")]
    NegativePrice(f64),
}

/// Active list filters keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductFilters(BTreeMap<String, String>);

impl ProductFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Entries with a non-empty value, in field-name order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProductFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub filters: ProductFilters,
}

impl PageQuery {
    pub fn new(page: u32, filters: ProductFilters) -> Self {
        Self {
            page: page.max(1),
            filters,
        }
    }

    /// Query-string pairs: active filters followed by `page`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .active()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub per_page: u32,
}

impl PaginationMeta {
    /// The collaborator answered for a page past the end without clamping.
    pub fn is_past_last_page(&self) -> bool {
        self.last_page >= 1 && self.current_page > self.last_page
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<Product>,
    pub meta: PaginationMeta,
}

fn price_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(value) => Ok(value),
        RawPrice::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid price '{text}'"))),
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
