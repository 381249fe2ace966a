//! In-process [`ProductStore`].
//!
//! Applies [`ProductFilter::matches`] directly, so it doubles as the
//! executable reference for what the SQL translation must return.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use inventory_core::error::CoreError;
use inventory_core::filter::ProductFilter;
use inventory_core::product::{parse_product_id, NewProduct, Product, ProductPatch};
use inventory_core::store::ProductStore;
use inventory_core::types::ProductId;
use tokio::sync::RwLock;

/// A stored record plus its insertion sequence, used to break
/// `created_at` ties so newer inserts still list first.
struct Entry {
    seq: u64,
    product: Product,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    next_seq: u64,
}

/// Product store held entirely in memory.
pub struct MemoryProductStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the backing store. While unavailable
    /// every operation fails with [`CoreError::StoreUnavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), CoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, CoreError> {
        self.ensure_available()?;
        let inner = self.inner.read().await;

        let mut matched: Vec<&Entry> = inner
            .entries
            .iter()
            .filter(|e| filter.matches(&e.product))
            .collect();
        matched.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(matched.into_iter().map(|e| e.product.clone()).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, CoreError> {
        self.ensure_available()?;
        let Some(id) = canonical_id(id) else {
            return Ok(None);
        };
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .find(|e| e.product.id == id)
            .map(|e| e.product.clone()))
    }

    async fn create(&self, input: NewProduct) -> Result<Product, CoreError> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let product = Product::from_new(ProductId::now_v7(), input, Utc::now());
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry {
            seq,
            product: product.clone(),
        });
        Ok(product)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, CoreError> {
        self.ensure_available()?;
        let Some(id) = canonical_id(id) else {
            return Ok(None);
        };
        let mut inner = self.inner.write().await;

        let Some(entry) = inner.entries.iter_mut().find(|e| e.product.id == id) else {
            return Ok(None);
        };
        patch.apply_to(&mut entry.product, Utc::now());
        Ok(Some(entry.product.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        self.ensure_available()?;
        let Some(id) = canonical_id(id) else {
            return Ok(false);
        };
        let mut inner = self.inner.write().await;

        let before = inner.entries.len();
        inner.entries.retain(|e| e.product.id != id);
        Ok(inner.entries.len() < before)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.ensure_available()
    }
}

/// Ids resolve the same way they do in Postgres: any UUID spelling maps to
/// the stored lowercase hyphenated form.
fn canonical_id(raw: &str) -> Option<String> {
    parse_product_id(raw).map(|id| id.to_string())
}
