//! Cart and line item types.

use std::collections::HashMap;

use crate::catalog::{ProductDetails, StockInfo};
use crate::error::CartError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A shopping cart snapshot.
///
/// Carts are values: every mutation below borrows `self` and returns the next
/// snapshot, so a cart that has been handed to a reader never changes under
/// it. Serialized as a bare JSON array of line items.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from line items, repairing invariants.
    ///
    /// See [`Cart::normalized`].
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }.normalized()
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line, or appends a new line with amount 1
    /// built from `details`. The resulting amount is checked against `stock`.
    ///
    /// Returns an error if:
    /// - The new amount exceeds the available stock
    /// - The product has no line and no details were supplied
    /// - The supplied details describe a different product
    pub fn with_added(
        &self,
        id: ProductId,
        stock: &StockInfo,
        details: Option<ProductDetails>,
    ) -> Result<Cart, CartError> {
        let current = self.amount_of(id).unwrap_or(0);
        let requested = current.saturating_add(1);

        if !stock.can_fulfill(requested) {
            return Err(CartError::OutOfStock {
                product_id: id,
                requested,
                available: stock.amount,
            });
        }

        let mut next = self.clone();
        if let Some(existing) = next.items.iter_mut().find(|i| i.id == id) {
            existing.amount = requested;
            return Ok(next);
        }

        let product = details.ok_or(CartError::NotFound(id))?;
        if product.id != id {
            return Err(CartError::RemoteFailure(format!(
                "product service returned id {} for {}",
                product.id, id
            )));
        }

        next.items.push(LineItem::from_product(product));
        Ok(next)
    }

    /// Set the amount of an existing line.
    ///
    /// Checks run in this order: positive amount, stock, presence.
    pub fn with_amount(
        &self,
        id: ProductId,
        amount: i64,
        stock: &StockInfo,
    ) -> Result<Cart, CartError> {
        if amount <= 0 {
            return Err(CartError::InvalidQuantity(amount));
        }

        if !stock.can_fulfill(amount) {
            return Err(CartError::OutOfStock {
                product_id: id,
                requested: amount,
                available: stock.amount,
            });
        }

        let mut next = self.clone();
        let item = next
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::NotFound(id))?;
        item.amount = amount;
        Ok(next)
    }

    /// Remove a product's line.
    pub fn without(&self, id: ProductId) -> Result<Cart, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CartError::NotFound(id))?;

        let mut next = self.clone();
        next.items.remove(index);
        Ok(next)
    }

    /// Repair a cart loaded from an untrusted snapshot.
    ///
    /// Lines with an amount below 1 are dropped. Duplicate ids are merged into
    /// the first occurrence, summing amounts.
    pub fn normalized(self) -> Cart {
        let mut items: Vec<LineItem> = Vec::with_capacity(self.items.len());
        for item in self.items {
            if item.amount < 1 {
                continue;
            }
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => existing.amount = existing.amount.saturating_add(item.amount),
                None => items.push(item),
            }
        }
        Cart { items }
    }

    /// Get all line items, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over line items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Get the line for a product.
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Check whether a product has a line.
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Amount in the cart for a product.
    pub fn amount_of(&self, id: ProductId) -> Option<i64> {
        self.get(id).map(|i| i.amount)
    }

    /// Amount per product, for listings that badge items already in the cart.
    pub fn amounts(&self) -> HashMap<ProductId, i64> {
        self.items.iter().map(|i| (i.id, i.amount)).collect()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line amounts.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.amount).sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// One product in the cart with its requested quantity.
///
/// Serialized flat: the product record with an `amount` field alongside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Quantity, always at least 1 inside a cart.
    pub amount: i64,
    /// Product attributes copied from the product service.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl LineItem {
    /// Create a line with amount 1 from a product record.
    pub fn from_product(product: ProductDetails) -> Self {
        let mut attributes = product.attributes;
        attributes.remove("amount");
        Self {
            id: product.id,
            amount: 1,
            attributes,
        }
    }

    /// Display title, if known.
    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }

    /// Unit price, if known.
    pub fn price(&self) -> Option<f64> {
        self.attributes.get("price").and_then(Value::as_f64)
    }
}
