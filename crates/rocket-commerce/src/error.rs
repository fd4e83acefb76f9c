//! Cart error types.

use crate::ids::ProductId;
use thiserror::Error;

/// Errors that can abort a cart operation.
///
/// Every variant leaves the cart exactly as it was before the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity is larger than the available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The operation targets a product that has no line in the cart.
    #[error("Product not in cart: {0}")]
    NotFound(ProductId),

    /// A stock or product lookup failed.
    #[error("Remote lookup failed: {0}")]
    RemoteFailure(String),

    /// Quantity is not positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
}

impl CartError {
    /// Build a remote failure from anything printable.
    pub fn remote(err: impl std::fmt::Display) -> Self {
        CartError::RemoteFailure(err.to_string())
    }

    /// Get the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::OutOfStock { .. } => ErrorKind::OutOfStock,
            CartError::NotFound(_) => ErrorKind::NotFound,
            CartError::RemoteFailure(_) => ErrorKind::RemoteFailure,
            CartError::InvalidQuantity(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Failure categories, used to pick the user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfStock,
    NotFound,
    RemoteFailure,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::OutOfStock => "out_of_stock",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RemoteFailure => "remote_failure",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::RemoteFailure(format!("malformed response: {}", e))
    }
}
