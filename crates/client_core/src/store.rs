use std::{fmt, sync::Arc};

use shared::domain::{
    PageQuery, PageResult, PaginationMeta, Product, ProductDraft, ProductFilters, ProductId,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    api::{HttpProductApi, ProductApi},
    error::{Result, StoreError},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const FIRST_PAGE: u32 = 1;

/// What a view layer renders from.
///
/// `products` and `pagination` describe the last applied page. `current_page`
/// is the page the next default fetch loads; after `set_filters` or
/// `set_current_page` it can differ from `pagination.current_page` until that
/// fetch lands.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub products: Vec<Product>,
    pub pagination: Option<PaginationMeta>,
    pub current_page: u32,
    pub filters: ProductFilters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied(PageResult),
    Superseded(PageResult),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }

    pub fn page(&self) -> &PageResult {
        match self {
            FetchOutcome::Applied(page) | FetchOutcome::Superseded(page) => page,
        }
    }

    pub fn into_page(self) -> PageResult {
        match self {
            FetchOutcome::Applied(page) | FetchOutcome::Superseded(page) => page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Show,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Show => "show",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Synced {
        current_page: u32,
        last_page: u32,
        total: u64,
    },
    Discarded {
        seq: u64,
    },
    Failed {
        operation: Operation,
        message: String,
    },
}

struct StoreState {
    products: Vec<Product>,
    pagination: Option<PaginationMeta>,
    current_page: u32,
    filters: ProductFilters,
    issued_seq: u64,
    synced: bool,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            pagination: None,
            current_page: FIRST_PAGE,
            filters: ProductFilters::default(),
            issued_seq: 0,
            synced: false,
        }
    }
}

/// Holds one page of the remote catalog and keeps it in step with the server.
pub struct ProductStore {
    api: Arc<dyn ProductApi>,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ProductStore {
    pub fn new(api: Arc<dyn ProductApi>) -> Arc<Self> {
        Self::with_filters(api, ProductFilters::default())
    }

    pub fn with_filters(api: Arc<dyn ProductApi>, filters: ProductFilters) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            inner: Mutex::new(StoreState {
                filters,
                ..StoreState::default()
            }),
            events,
        })
    }

    pub fn over_http(api_url: &str) -> std::result::Result<Arc<Self>, url::ParseError> {
        Ok(Self::new(Arc::new(HttpProductApi::new(api_url)?)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let guard = self.inner.lock().await;
        StoreSnapshot {
            products: guard.products.clone(),
            pagination: guard.pagination,
            current_page: guard.current_page,
            filters: guard.filters.clone(),
        }
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.lock().await.products.clone()
    }

    pub async fn pagination(&self) -> Option<PaginationMeta> {
        self.inner.lock().await.pagination
    }

    pub async fn current_page(&self) -> u32 {
        self.inner.lock().await.current_page
    }

    pub async fn filters(&self) -> ProductFilters {
        self.inner.lock().await.filters.clone()
    }

    pub async fn ensure_loaded(&self) -> Result<StoreSnapshot> {
        let synced = self.inner.lock().await.synced;
        if !synced {
            self.fetch(None, None).await?;
        }
        Ok(self.snapshot().await)
    }

    pub async fn fetch(
        &self,
        page: Option<u32>,
        filters: Option<ProductFilters>,
    ) -> Result<FetchOutcome> {
        let (seq, query) = {
            let mut guard = self.inner.lock().await;
            guard.issued_seq += 1;
            let page = page.unwrap_or(guard.current_page);
            let filters = filters.unwrap_or_else(|| guard.filters.clone());
            (guard.issued_seq, PageQuery::new(page, filters))
        };
        debug!("store: fetch issued seq={seq} page={}", query.page);

        let result = match self.api.list(&query).await {
            Ok(result) => result,
            Err(err) => {
                self.report_failure(Operation::Fetch, &err);
                return Err(err);
            }
        };

        let mut guard = self.inner.lock().await;
        if seq != guard.issued_seq {
            let latest = guard.issued_seq;
            drop(guard);
            info!(
                "store: discarding superseded page seq={seq} latest={latest} page={}",
                result.meta.current_page
            );
            let _ = self.events.send(StoreEvent::Discarded { seq });
            return Ok(FetchOutcome::Superseded(result));
        }

        guard.products = result.items.clone();
        guard.pagination = Some(result.meta);
        guard.current_page = result.meta.current_page.max(FIRST_PAGE);
        guard.filters = query.filters;
        guard.synced = true;
        drop(guard);

        info!(
            "store: page applied seq={seq} requested={} current={} last={} total={} items={}",
            query.page,
            result.meta.current_page,
            result.meta.last_page,
            result.meta.total,
            result.items.len()
        );
        let _ = self.events.send(StoreEvent::Synced {
            current_page: result.meta.current_page,
            last_page: result.meta.last_page,
            total: result.meta.total,
        });
        Ok(FetchOutcome::Applied(result))
    }

    /// Replaces the active filters; the next default fetch starts at page 1.
    pub async fn set_filters(&self, filters: ProductFilters) {
        let mut guard = self.inner.lock().await;
        guard.filters = filters;
        guard.current_page = FIRST_PAGE;
        guard.issued_seq += 1;
    }

    pub async fn set_current_page(&self, page: u32) {
        let mut guard = self.inner.lock().await;
        guard.current_page = page.max(FIRST_PAGE);
        guard.issued_seq += 1;
    }

    pub async fn show(&self, id: ProductId) -> Result<Product> {
        self.api.show(id).await.map_err(|err| {
            self.report_failure(Operation::Show, &err);
            err
        })
    }

    pub async fn find(&self, id: ProductId) -> Result<Product> {
        let cached = self
            .inner
            .lock()
            .await
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned();
        match cached {
            Some(product) => Ok(product),
            None => self.show(id).await,
        }
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<()> {
        let created = self.api.create(draft).await.map_err(|err| {
            self.report_failure(Operation::Create, &err);
            err
        })?;
        match created {
            Some(product) => info!("store: created product id={}", product.id),
            None => info!("store: created product name={}", draft.name),
        }

        self.refetch(Some(FIRST_PAGE)).await?;
        Ok(())
    }

    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<()> {
        self.api.update(id, draft).await.map_err(|err| {
            self.report_failure(Operation::Update, &err);
            err
        })?;
        info!("store: updated product id={id}");

        self.refetch(None).await?;
        Ok(())
    }

    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.api.delete(id).await.map_err(|err| {
            self.report_failure(Operation::Delete, &err);
            err
        })?;
        info!("store: deleted product id={id}");

        let outcome = self.refetch(None).await?;
        if let FetchOutcome::Applied(page) = &outcome {
            // Servers that do not clamp answer an emptied last page with an
            // empty result beyond `last_page`.
            if page.items.is_empty() && page.meta.is_past_last_page() {
                info!(
                    "store: page {} no longer exists, moving to last_page={}",
                    page.meta.current_page, page.meta.last_page
                );
                self.refetch(Some(page.meta.last_page)).await?;
            }
        }
        Ok(())
    }

    async fn refetch(&self, page: Option<u32>) -> Result<FetchOutcome> {
        self.fetch(page, None)
            .await
            .map_err(|err| StoreError::Refetch(Box::new(err)))
    }

    fn report_failure(&self, operation: Operation, err: &StoreError) {
        warn!("store: {operation} failed: {err}");
        let _ = self.events.send(StoreEvent::Failed {
            operation,
            message: err.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
