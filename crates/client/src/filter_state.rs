//! The dashboard's filter selection and its translation into listing
//! parameters.

use indexmap::IndexSet;
use inventory_core::filter::ProductQuery;
use inventory_core::product::normalize_category;

/// Lowest selectable price.
pub const PRICE_FLOOR: f64 = 0.0;

/// Highest selectable price. A `max_price` at the ceiling means "no upper bound".
pub const PRICE_CEILING: f64 = 700_000.0;

/// Search text shorter than this (after trimming) is not sent.
pub const MIN_SEARCH_CHARS: usize = 3;

/// Multi-select facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Size,
    Color,
    Category,
}

/// Current filter selection. Tag sets keep selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub size: IndexSet<String>,
    pub color: IndexSet<String>,
    pub category: IndexSet<String>,
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            size: IndexSet::new(),
            color: IndexSet::new(),
            category: IndexSet::new(),
            min_price: PRICE_FLOOR,
            max_price: PRICE_CEILING,
        }
    }
}

impl FilterState {
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Select `tag` if absent, deselect it if present. Category tags are
    /// normalized first so free-text entries collapse onto stored values.
    pub fn toggle(&mut self, facet: Facet, tag: &str) {
        let (set, tag) = match facet {
            Facet::Size => (&mut self.size, tag.to_string()),
            Facet::Color => (&mut self.color, tag.to_string()),
            Facet::Category => (&mut self.category, normalize_category(tag)),
        };
        if tag.is_empty() {
            return;
        }
        if !set.shift_remove(&tag) {
            set.insert(tag);
        }
    }

    pub fn set_min_price(&mut self, value: f64) {
        self.min_price = clamp_price(value);
    }

    pub fn set_max_price(&mut self, value: f64) {
        self.max_price = clamp_price(value);
    }

    /// Restore the defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build listing parameters, omitting every facet that does not
    /// constrain the result.
    ///
    /// The price bounds are omitted asymmetrically: `minPrice` only at the
    /// floor, `maxPrice` only at the ceiling.
    pub fn to_query(&self) -> ProductQuery {
        let search = self.search.trim();
        ProductQuery {
            search: (search.chars().count() >= MIN_SEARCH_CHARS).then(|| search.to_string()),
            size: join_tags(&self.size),
            color: join_tags(&self.color),
            category: join_tags(&self.category),
            min_price: (self.min_price != PRICE_FLOOR).then(|| self.min_price.to_string()),
            max_price: (self.max_price != PRICE_CEILING).then(|| self.max_price.to_string()),
        }
    }
}

fn join_tags(tags: &IndexSet<String>) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.iter().map(String::as_str).collect::<Vec<_>>().join(","))
    }
}

fn clamp_price(value: f64) -> f64 {
    if value.is_nan() {
        return PRICE_FLOOR;
    }
    value.clamp(PRICE_FLOOR, PRICE_CEILING)
}
