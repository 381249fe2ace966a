//! Debounced listing loop.
//!
//! [`FilterStateManager`] is the single owner of the active [`FilterState`].
//! Edits are published on a `watch` channel; a background task waits until
//! the state has been quiet for the quiescence window and then issues one
//! listing query. Every query carries a generation number and only the
//! response of the latest generation is applied, so a slow stale response
//! can never overwrite a fresher listing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use inventory_core::filter::ProductQuery;
use inventory_core::product::{NewProduct, Product};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{ClientError, ProductBackend};
use crate::filter_state::{Facet, FilterState};
use crate::notification::Notifier;

/// Default quiescence window between the last edit and the query.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(400);

const FETCH_FAILED: &str = "Error fetching products";
const SAVE_FAILED: &str = "Server connection error";
const RETIRE_FAILED: &str = "Failed to retire product";

/// The listing currently shown to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Generation of the query that produced `products` (0 before the first).
    pub generation: u64,
    pub products: Vec<Product>,
    /// A query has been issued and its response is not applied yet.
    pub loading: bool,
}

/// Owns the filter selection and the listing it produces.
pub struct FilterStateManager {
    filters: watch::Sender<FilterState>,
    fetcher: Fetcher,
    cancel: CancellationToken,
    debounce: JoinHandle<()>,
}

impl FilterStateManager {
    /// Start a manager with the default quiescence window.
    pub fn spawn(backend: Arc<dyn ProductBackend>) -> Self {
        Self::with_window(backend, DEFAULT_QUIESCENCE, Notifier::default())
    }

    /// Start a manager with an explicit window and notifier.
    ///
    /// The initial (default) state is fetched once the first window elapses.
    pub fn with_window(
        backend: Arc<dyn ProductBackend>,
        window: Duration,
        notifier: Notifier,
    ) -> Self {
        let (filters, rx) = watch::channel(FilterState::default());
        let (listing, _) = watch::channel(Listing::default());
        let fetcher = Fetcher {
            backend,
            listing: Arc::new(listing),
            issued: Arc::new(AtomicU64::new(0)),
            notifier,
        };
        let cancel = CancellationToken::new();

        let debounce = tokio::spawn(debounce_loop(
            rx,
            window,
            fetcher.clone(),
            cancel.clone(),
        ));

        Self {
            filters,
            fetcher,
            cancel,
            debounce,
        }
    }

    // -----------------------------------------------------------------------
    // Filter edits
    // -----------------------------------------------------------------------

    /// Snapshot of the current selection.
    pub fn state(&self) -> FilterState {
        self.filters.borrow().clone()
    }

    /// Apply an edit. Every edit restarts the quiescence window.
    pub fn update(&self, edit: impl FnOnce(&mut FilterState)) {
        self.filters.send_modify(edit);
    }

    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.set_search(text));
    }

    pub fn toggle(&self, facet: Facet, tag: &str) {
        self.update(|state| state.toggle(facet, tag));
    }

    pub fn set_min_price(&self, value: f64) {
        self.update(|state| state.set_min_price(value));
    }

    pub fn set_max_price(&self, value: f64) {
        self.update(|state| state.set_max_price(value));
    }

    pub fn reset(&self) {
        self.update(FilterState::reset);
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    pub fn listing(&self) -> watch::Receiver<Listing> {
        self.fetcher.listing.subscribe()
    }

    pub fn current_listing(&self) -> Listing {
        self.fetcher.listing.borrow().clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.fetcher.notifier
    }

    /// Query immediately with the current selection, bypassing the debounce,
    /// and wait for the response to be applied (or discarded as stale).
    pub async fn refresh(&self) {
        let query = self.filters.borrow().to_query();
        if let Err(e) = self.fetcher.issue(query).await {
            tracing::warn!(error = %e, "Listing task failed");
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a product, or update `editing` with the submitted fields, then
    /// refresh the listing. Outcome is reported through the notifier.
    pub async fn save(
        &self,
        payload: NewProduct,
        editing: Option<&str>,
    ) -> Result<Product, ClientError> {
        let backend = &self.fetcher.backend;
        let result = match editing {
            Some(id) => backend.update_product(id, &payload.into()).await,
            None => backend.create_product(&payload).await,
        };

        match result {
            Ok(product) => {
                let verb = if editing.is_some() { "updated" } else { "added" };
                self.notifier()
                    .success(format!("Product {verb} successfully"));
                self.refresh().await;
                Ok(product)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save product");
                self.notifier()
                    .error(e.server_message().unwrap_or(SAVE_FAILED).to_string());
                Err(e)
            }
        }
    }

    /// Delete a product and refresh the listing.
    pub async fn retire(&self, id: &str) -> Result<(), ClientError> {
        match self.fetcher.backend.delete_product(id).await {
            Ok(()) => {
                self.notifier().success("Product retired successfully");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, product_id = id, "Failed to retire product");
                self.notifier().error(RETIRE_FAILED);
                Err(e)
            }
        }
    }

    /// Stop the debounce task. In-flight queries still complete.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether the debounce task has exited.
    pub fn is_stopped(&self) -> bool {
        self.debounce.is_finished()
    }
}

impl Drop for FilterStateManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Issues listing queries and applies only the latest generation's result.
#[derive(Clone)]
struct Fetcher {
    backend: Arc<dyn ProductBackend>,
    listing: Arc<watch::Sender<Listing>>,
    issued: Arc<AtomicU64>,
    notifier: Notifier,
}

impl Fetcher {
    /// Tag `query` with the next generation and run it on its own task.
    /// Earlier in-flight queries are not cancelled.
    fn issue(&self, query: ProductQuery) -> JoinHandle<()> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.listing.send_modify(|listing| listing.loading = true);

        let this = self.clone();
        tokio::spawn(async move { this.run(generation, query).await })
    }

    async fn run(&self, generation: u64, query: ProductQuery) {
        tracing::debug!(generation, ?query, "Fetching products");
        let result = self.backend.list_products(&query).await;

        match result {
            Ok(products) => {
                let count = products.len();
                let applied = self.listing.send_if_modified(|listing| {
                    if !self.is_latest(generation) {
                        return false;
                    }
                    *listing = Listing {
                        generation,
                        products,
                        loading: false,
                    };
                    true
                });
                if applied {
                    tracing::debug!(generation, count, "Applied product listing");
                } else {
                    tracing::debug!(generation, "Discarded stale product listing");
                }
            }
            Err(e) => {
                if !self.is_latest(generation) {
                    tracing::debug!(generation, error = %e, "Ignoring failure of stale query");
                    return;
                }
                tracing::warn!(generation, error = %e, "Failed to fetch products");
                self.listing.send_if_modified(|listing| {
                    let latest = self.is_latest(generation);
                    if latest {
                        listing.loading = false;
                    }
                    latest
                });
                self.notifier.error(FETCH_FAILED);
            }
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == generation
    }
}

// ---------------------------------------------------------------------------
// Debounce loop
// ---------------------------------------------------------------------------

/// Wait for the filters to stay unchanged for `window`, issue one query,
/// then wait for the next edit. Exits on cancellation or when the manager
/// (the sender side) is dropped.
async fn debounce_loop(
    mut rx: watch::Receiver<FilterState>,
    window: Duration,
    fetcher: Fetcher,
    cancel: CancellationToken,
) {
    loop {
        let mut deadline = Instant::now() + window;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep_until(deadline) => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    deadline = Instant::now() + window;
                }
            }
        }

        let query = rx.borrow_and_update().to_query();
        // Not awaited: a newer query may be issued while this one is in flight.
        drop(fetcher.issue(query));

        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}
