//! Dependency tagging for semantic categorization.

use std::time::Duration;

/// Remote dependencies the cart talks to.
///
/// Each tag carries a default timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Stock checks (`/stock/{id}`).
    Inventory,
    /// Product details (`/products/{id}`).
    Catalog,
    /// Custom dependency with name.
    Custom(&'static str),
}

impl DependencyTag {
    /// Get the default timeout for this dependency type.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Inventory => Duration::from_millis(2_000),
            Self::Catalog => Duration::from_millis(5_000),
            Self::Custom(_) => Duration::from_millis(5_000),
        }
    }

    /// Get the default max retries for this dependency type.
    ///
    /// A failed lookup ends the cart operation, so nothing retries unless a
    /// policy override says so.
    pub fn default_max_retries(&self) -> u32 {
        0
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &str {
        match self {
            Self::Inventory => "inventory",
            Self::Catalog => "catalog",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
