//! Product entity and the create/update payloads.
//!
//! Payloads are normalized (trimmed, category lowercased) before they are
//! validated, so stores only ever see clean values.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::types::{ProductId, Timestamp};

/// Placeholder image token stored when a product is created without one.
pub const DEFAULT_IMAGE: &str = "default.png";

/// A catalog entry as returned by every store backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier, opaque to callers.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

impl Product {
    /// Build a fresh record from a validated payload.
    pub fn from_new(id: ProductId, input: NewProduct, now: Timestamp) -> Self {
        Self {
            id: id.to_string(),
            name: input.name,
            price: input.price.unwrap_or(0.0),
            category: input.category,
            description: input.description,
            image: input.image.unwrap_or_else(default_image),
            size: input.size,
            color: input.color,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for `POST /products`.
///
/// Missing `name`/`category` deserialize as empty strings so that the
/// failure surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(default, alias = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
}

impl NewProduct {
    /// Normalize and validate the payload.
    pub fn into_validated(self) -> Result<Self, CoreError> {
        let normalized = Self {
            name: self.name.trim().to_string(),
            price: self.price,
            category: normalize_category(&self.category),
            description: non_blank(self.description),
            image: non_blank(self.image),
            size: normalize_tags(self.size),
            color: normalize_tags(self.color),
        };
        normalized
            .validate()
            .map_err(|e| CoreError::Validation(validation_message(&e)))?;
        Ok(normalized)
    }
}

/// Partial update payload for `PUT /products/{id}`.
///
/// Absent fields leave the stored value untouched. After normalization a
/// blank `image` resets to [`DEFAULT_IMAGE`] and a blank `description`
/// (carried as `Some("")`) clears it, matching what create stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: Option<String>,
    #[serde(alias = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<String>>,
}

impl ProductPatch {
    /// Normalize and validate the supplied fields.
    pub fn into_validated(self) -> Result<Self, CoreError> {
        let normalized = Self {
            name: self.name.map(|n| n.trim().to_string()),
            price: self.price,
            category: self.category.as_deref().map(normalize_category),
            description: self.description.map(|d| d.trim().to_string()),
            image: self
                .image
                .map(|i| non_blank(Some(i)).unwrap_or_else(default_image)),
            size: self.size.map(normalize_tags),
            color: self.color.map(normalize_tags),
        };
        normalized
            .validate()
            .map_err(|e| CoreError::Validation(validation_message(&e)))?;
        Ok(normalized)
    }

    /// Merge the supplied fields onto `product` and bump `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: Timestamp) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(description) = &self.description {
            product.description = non_blank(Some(description.clone()));
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        if let Some(size) = &self.size {
            product.size = size.clone();
        }
        if let Some(color) = &self.color {
            product.color = color.clone();
        }
        product.updated_at = now;
    }
}

/// A full form submission applied as an update.
impl From<NewProduct> for ProductPatch {
    fn from(input: NewProduct) -> Self {
        Self {
            name: Some(input.name),
            price: input.price,
            category: Some(input.category),
            description: input.description,
            image: input.image,
            size: Some(input.size),
            color: Some(input.color),
        }
    }
}

/// Categories are stored trimmed and lowercased; filter tokens get the same
/// treatment so lookups agree with stored values.
pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse an opaque identifier. Anything that is not a UUID cannot resolve.
pub fn parse_product_id(raw: &str) -> Option<ProductId> {
    ProductId::parse_str(raw.trim()).ok()
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
