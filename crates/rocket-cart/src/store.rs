//! The cart store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rocket_cache::{Cache, CacheError};
use rocket_commerce::cart::Cart;
use rocket_commerce::ports::{ProductLookup, StockLookup};
use rocket_commerce::{CartError, ErrorKind, ProductId};
use tokio::sync::watch;

use crate::notice::{LogNotifier, Notice, Notifier, Operation};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Target amount. Non-positive values are ignored.
    pub amount: i64,
}

impl UpdateProductAmount {
    pub fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}

/// Result of a cart operation.
///
/// Operations never fail towards the caller: a rejected operation has
/// already been reported through the store's [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The cart changed and the new snapshot was published.
    Committed,
    /// The request was a silent no-op.
    Ignored,
    /// The cart is unchanged and a notice was emitted.
    Rejected(CartError),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }

    /// The rejection reason, if any.
    pub fn error(&self) -> Option<&CartError> {
        match self {
            Outcome::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Category of the rejection, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error().map(CartError::kind)
    }
}

/// Shared, observable shopping cart.
///
/// Each operation reads the current snapshot, awaits the remote checks it
/// needs, then commits a new snapshot computed from whatever is current at
/// commit time. Nothing visible is touched before the checks resolve, so an
/// operation either publishes a complete new cart or leaves it as it was.
///
/// After every commit the cart is written to the durable store under
/// `storage_key`.
pub struct CartStore {
    state: watch::Sender<Arc<Cart>>,
    stock: Arc<dyn StockLookup>,
    products: Arc<dyn ProductLookup>,
    cache: Cache,
    storage_key: String,
    notifier: Arc<dyn Notifier>,
    dirty: AtomicBool,
}

impl CartStore {
    /// Open the store, restoring the cart persisted under `storage_key`.
    ///
    /// Starts empty when nothing is stored. An unreadable snapshot is logged
    /// and replaced by an empty cart on the next commit.
    pub fn open(
        cache: Cache,
        storage_key: impl Into<String>,
        stock: Arc<dyn StockLookup>,
        products: Arc<dyn ProductLookup>,
    ) -> Self {
        let storage_key = storage_key.into();

        let cart = match cache.get::<Cart>(&storage_key) {
            Ok(Some(cart)) => cart.normalized(),
            Ok(None) => Cart::new(),
            Err(err) => {
                tracing::warn!(key = %storage_key, error = %err, "discarding unreadable cart snapshot");
                Cart::new()
            }
        };
        tracing::debug!(key = %storage_key, lines = cart.len(), "cart restored");

        let (state, _) = watch::channel(Arc::new(cart));
        Self {
            state,
            stock,
            products,
            cache,
            storage_key,
            notifier: Arc::new(LogNotifier),
            dirty: AtomicBool::new(false),
        }
    }

    /// Replace the notice surface.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        self.state.borrow().clone()
    }

    /// Watch the cart. The receiver is marked changed after every commit.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.state.subscribe()
    }

    /// Key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Whether a committed cart has not been written yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Add one unit of a product.
    ///
    /// The stock service is always consulted. Product details are fetched only
    /// when the product is not in the cart yet and stock allows at least one.
    pub async fn add_product(&self, product_id: ProductId) -> Outcome {
        let result = self.try_add(product_id).await;
        self.finish(Operation::Add, product_id, result)
    }

    /// Remove a product's line.
    pub fn remove_product(&self, product_id: ProductId) -> Outcome {
        let result = self.commit(|cart| cart.without(product_id));
        self.finish(Operation::Remove, product_id, result)
    }

    /// Set a product's amount, within stock.
    ///
    /// Non-positive amounts are ignored without a notice and without a
    /// stock lookup.
    pub async fn update_product_amount(&self, update: UpdateProductAmount) -> Outcome {
        let result = self.try_update(update).await;
        self.finish(Operation::Update, update.product_id, result)
    }

    /// Write the cart if a commit has not been persisted yet.
    ///
    /// Returns whether a write happened. On failure the cart stays dirty so
    /// the next commit or flush retries.
    pub fn flush(&self) -> Result<bool, CacheError> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        let cart = self.cart();
        if let Err(err) = self.cache.set(&self.storage_key, cart.as_ref()) {
            self.dirty.store(true, Ordering::Release);
            return Err(err);
        }

        tracing::debug!(key = %self.storage_key, lines = cart.len(), "cart persisted");
        Ok(true)
    }

    async fn try_add(&self, id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        let stock = self.stock.stock(id).await?;

        tracing::debug!(
            product_id = %id,
            current = snapshot.amount_of(id).unwrap_or(0),
            available = stock.amount,
            "stock checked"
        );

        // Dry run against the snapshot: out-of-stock ends here, and a missing
        // line is the only case that needs the product record.
        let details = match snapshot.with_added(id, &stock, None) {
            Ok(_) => None,
            Err(CartError::NotFound(_)) => Some(self.products.product(id).await?),
            Err(err) => return Err(err),
        };

        let fetched = details.is_some();
        match self.commit(|cart| cart.with_added(id, &stock, details)) {
            // The line was removed while the stock lookup was in flight.
            Err(CartError::NotFound(_)) if !fetched => {
                let details = self.products.product(id).await?;
                self.commit(|cart| cart.with_added(id, &stock, Some(details)))
            }
            result => result,
        }
    }

    async fn try_update(&self, update: UpdateProductAmount) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount <= 0 {
            return Err(CartError::InvalidQuantity(amount));
        }

        let stock = self.stock.stock(product_id).await?;
        self.commit(|cart| cart.with_amount(product_id, amount, &stock))
    }

    /// Apply `transform` to the latest snapshot and publish the result.
    fn commit<F>(&self, transform: F) -> Result<(), CartError>
    where
        F: FnOnce(&Cart) -> Result<Cart, CartError>,
    {
        let mut result = Ok(());
        self.state.send_if_modified(|current| match transform(current.as_ref()) {
            Ok(next) => {
                *current = Arc::new(next);
                true
            }
            Err(err) => {
                result = Err(err);
                false
            }
        });
        result?;

        self.dirty.store(true, Ordering::Release);
        if let Err(err) = self.flush() {
            tracing::warn!(key = %self.storage_key, error = %err, "cart persistence failed; will retry on next change");
        }
        Ok(())
    }

    fn finish(&self, operation: Operation, product_id: ProductId, result: Result<(), CartError>) -> Outcome {
        match result {
            Ok(()) => {
                tracing::info!(operation = operation.as_str(), product_id = %product_id, "cart updated");
                Outcome::Committed
            }
            Err(CartError::InvalidQuantity(amount)) if operation == Operation::Update => {
                tracing::debug!(product_id = %product_id, amount, "ignoring non-positive amount");
                Outcome::Ignored
            }
            Err(err) => {
                let notice = Notice::for_failure(operation, &err);
                tracing::warn!(
                    operation = operation.as_str(),
                    product_id = %product_id,
                    kind = %err.kind(),
                    notice = notice.as_str(),
                    error = %err,
                    "cart operation rejected"
                );
                self.notifier.notify(notice);
                Outcome::Rejected(err)
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart())
            .field("storage_key", &self.storage_key)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}
