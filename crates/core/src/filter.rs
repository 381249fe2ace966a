//! Listing filters: the wire contract and its typed form.
//!
//! [`ProductQuery`] is exactly what travels in the query string of
//! `GET /api/v1/products`; the client builds it and the server parses it.
//! [`ProductFilter`] is the typed, normalized form handed to a store.
//!
//! Semantics, per facet:
//!
//! - `search`: case-insensitive substring match on `name`.
//! - `size` / `color`: the product list shares at least one listed tag.
//! - `category`: the product category equals one of the listed values.
//! - `minPrice` / `maxPrice`: inclusive bounds.
//!
//! Facets combine with AND; an absent facet is no constraint at all.

use serde::{Deserialize, Serialize};

use crate::product::{normalize_category, Product};

/// Raw listing parameters, all optional, lists comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

impl ProductQuery {
    /// Collect raw query-string pairs. A key given more than once has its
    /// values joined with commas, so `size=s&size=m` reads as `size=s,m`.
    /// Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "search" => &mut query.search,
                "size" => &mut query.size,
                "color" => &mut query.color,
                "category" => &mut query.category,
                "minPrice" => &mut query.min_price,
                "maxPrice" => &mut query.max_price,
                _ => continue,
            };
            *slot = Some(match slot.take() {
                Some(existing) => format!("{existing},{value}"),
                None => value,
            });
        }
        query
    }
}

/// Typed listing filter. Empty vectors and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub categories: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl From<&ProductQuery> for ProductFilter {
    fn from(query: &ProductQuery) -> Self {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            search,
            sizes: split_list(query.size.as_deref()),
            colors: split_list(query.color.as_deref()),
            categories: split_list(query.category.as_deref())
                .iter()
                .map(|c| normalize_category(c))
                .collect(),
            min_price: parse_price(query.min_price.as_deref()),
            max_price: parse_price(query.max_price.as_deref()),
        }
    }
}

impl ProductFilter {
    /// True when no facet constrains the listing.
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_none()
            && self.sizes.is_empty()
            && self.colors.is_empty()
            && self.categories.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Reference semantics of the filter, evaluated in memory.
    ///
    /// The SQL translation in the persistence layer must agree with this.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if !self.sizes.is_empty() && !intersects(&product.size, &self.sizes) {
            return false;
        }
        if !self.colors.is_empty() && !intersects(&product.color, &self.colors) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }
}

/// Split a comma-joined list, trimming tokens and dropping empty ones.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Coerce-or-ignore: a bound that is empty, unparseable or not finite is
/// dropped instead of rejecting the request.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn intersects(tags: &[String], wanted: &[String]) -> bool {
    tags.iter().any(|t| wanted.contains(t))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(name: &str, category: &str, price: f64, size: &[&str], color: &[&str]) -> Product {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            price,
            category: category.to_string(),
            description: None,
            image: crate::product::DEFAULT_IMAGE.to_string(),
            size: size.iter().map(|s| s.to_string()).collect(),
            color: color.iter().map(|s| s.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn filter(query: ProductQuery) -> ProductFilter {
        ProductFilter::from(&query)
    }

    #[test]
    fn empty_query_is_unconstrained() {
        let f = filter(ProductQuery::default());
        assert!(f.is_unconstrained());
        assert!(f.matches(&product("Anything", "misc", 0.0, &[], &[])));
    }

    #[test]
    fn blank_lists_are_absent_not_match_empty() {
        let f = filter(ProductQuery {
            size: Some(",, ,".to_string()),
            search: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(f.is_unconstrained());
    }

    #[test]
    fn search_is_case_insensitive_substring_on_name() {
        let f = filter(ProductQuery {
            search: Some("WIDG".to_string()),
            ..Default::default()
        });
        assert!(f.matches(&product("Blue widget", "tools", 1.0, &[], &[])));
        assert!(!f.matches(&product("Gadget", "widgets", 1.0, &[], &[])));
    }

    #[test]
    fn size_list_is_a_union() {
        let f = filter(ProductQuery {
            size: Some("s,xl".to_string()),
            ..Default::default()
        });
        assert_eq!(f.sizes, vec!["s".to_string(), "xl".to_string()]);
        assert!(f.matches(&product("A", "c", 1.0, &["s"], &[])));
        assert!(f.matches(&product("B", "c", 1.0, &["m", "xl"], &[])));
        assert!(!f.matches(&product("C", "c", 1.0, &["m"], &[])));
        assert!(!f.matches(&product("D", "c", 1.0, &[], &[])));
    }

    #[test]
    fn category_tokens_are_normalized() {
        let f = filter(ProductQuery {
            category: Some(" Tools ,Food".to_string()),
            ..Default::default()
        });
        assert_eq!(f.categories, vec!["tools".to_string(), "food".to_string()]);
        assert!(f.matches(&product("A", "food", 1.0, &[], &[])));
        assert!(!f.matches(&product("B", "sports", 1.0, &[], &[])));
    }

    #[test]
    fn facets_combine_with_and() {
        let f = filter(ProductQuery {
            color: Some("red".to_string()),
            category: Some("clothes".to_string()),
            ..Default::default()
        });
        assert!(f.matches(&product("Shirt", "clothes", 1.0, &[], &["red"])));
        assert!(!f.matches(&product("Shirt", "clothes", 1.0, &[], &["blue"])));
        assert!(!f.matches(&product("Car", "vehicle", 1.0, &[], &["red"])));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let f = filter(ProductQuery {
            min_price: Some("50".to_string()),
            max_price: Some("200".to_string()),
            ..Default::default()
        });
        assert!(f.matches(&product("A", "c", 50.0, &[], &[])));
        assert!(f.matches(&product("B", "c", 200.0, &[], &[])));
        assert!(!f.matches(&product("C", "c", 200.5, &[], &[])));
    }

    #[test]
    fn inverted_price_range_matches_nothing() {
        let f = filter(ProductQuery {
            min_price: Some("300".to_string()),
            max_price: Some("100".to_string()),
            ..Default::default()
        });
        for price in [0.0, 100.0, 200.0, 300.0, 1000.0] {
            assert!(!f.matches(&product("A", "c", price, &[], &[])));
        }
    }

    #[test]
    fn malformed_price_bounds_are_ignored() {
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some("NaN")), None);
        assert_eq!(parse_price(Some("inf")), None);
        assert_eq!(parse_price(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_price(None), None);

        let f = filter(ProductQuery {
            min_price: Some("cheap".to_string()),
            ..Default::default()
        });
        assert!(f.is_unconstrained());
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_keys_are_joined() {
        let q = ProductQuery::from_pairs(pairs(&[
            ("size", "s"),
            ("color", "red"),
            ("size", "m"),
            ("page", "2"),
        ]));
        assert_eq!(q.size.as_deref(), Some("s,m"));
        assert_eq!(q.color.as_deref(), Some("red"));
        assert_eq!(filter(q).sizes, vec!["s".to_string(), "m".to_string()]);
    }

    #[test]
    fn repeated_price_bound_is_ignored() {
        let q = ProductQuery::from_pairs(pairs(&[
            ("minPrice", "1"),
            ("minPrice", "2"),
            ("maxPrice", "10"),
        ]));
        let f = filter(q);
        assert_eq!(f.min_price, None);
        assert_eq!(f.max_price, Some(10.0));
    }

    #[test]
    fn query_serializes_with_camel_case_and_skips_absent() {
        let q = ProductQuery {
            max_price: Some("699999".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value, serde_json::json!({ "maxPrice": "699999" }));
    }
}
