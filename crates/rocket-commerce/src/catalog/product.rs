//! Product details as returned by the product service.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Full product record.
///
/// Only the `id` is interpreted; everything else (`title`, `price`, `image`,
/// ...) is kept verbatim so it can be copied onto a cart line and shown by the
/// UI without this crate knowing the catalog schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    /// Product identifier.
    pub id: ProductId,
    /// Opaque product attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ProductDetails {
    /// Create a product with no attributes.
    pub fn new(id: ProductId) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Display title, if the catalog provides one.
    pub fn title(&self) -> Option<&str> {
        self.attribute("title").and_then(Value::as_str)
    }

    /// Unit price, if the catalog provides a numeric one.
    pub fn price(&self) -> Option<f64> {
        self.attribute("price").and_then(Value::as_f64)
    }

    /// Image URL, if the catalog provides one.
    pub fn image(&self) -> Option<&str> {
        self.attribute("image").and_then(Value::as_str)
    }
}
