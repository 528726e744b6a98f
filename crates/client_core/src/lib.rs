//! Client-side data layer for the product catalog API.
//!
//! [`ProductStore`] owns the visible page of products and re-synchronizes it
//! from a [`ProductApi`] after every mutation. [`HttpProductApi`] is the
//! production implementation of that seam.

pub mod api;
pub mod error;
pub mod store;

pub use api::{HttpProductApi, ProductApi};
pub use error::StoreError;
pub use store::{FetchOutcome, Operation, ProductStore, StoreEvent, StoreSnapshot};

#[cfg(test)]
#[path = "tests/fake_catalog.rs"]
mod fake_catalog;
