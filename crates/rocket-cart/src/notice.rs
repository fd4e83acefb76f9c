//! User-facing notices.

use rocket_commerce::{CartError, ErrorKind};
use tokio::sync::mpsc;

/// Cart operation that produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Update => "update",
        }
    }
}

/// Message categories shown to the shopper when an operation is rejected.
///
/// The category is the contract; [`Notice::message`] is only a default
/// wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Requested quantity exceeds stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a quantity failed.
    UpdateFailed,
}

impl Notice {
    /// Pick the notice for a rejected operation.
    ///
    /// Out-of-stock has its own message whatever the operation; every other
    /// failure gets the operation's generic message.
    pub fn for_failure(operation: Operation, error: &CartError) -> Self {
        if error.kind() == ErrorKind::OutOfStock {
            return Notice::OutOfStock;
        }
        match operation {
            Operation::Add => Notice::AddFailed,
            Operation::Remove => Notice::RemoveFailed,
            Operation::Update => Notice::UpdateFailed,
        }
    }

    /// Default wording.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::OutOfStock => "Requested quantity is out of stock",
            Notice::AddFailed => "Could not add the product",
            Notice::RemoveFailed => "Could not remove the product",
            Notice::UpdateFailed => "Could not change the product quantity",
        }
    }

    /// Stable identifier for logs and UI lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Notice::OutOfStock => "out_of_stock",
            Notice::AddFailed => "add_failed",
            Notice::RemoveFailed => "remove_failed",
            Notice::UpdateFailed => "update_failed",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Surface that shows notices to the shopper (toasts, banners, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log. Used when no UI surface is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = notice.as_str(), "{}", notice.message());
    }
}

/// Forwards notices to a receiver owned by the UI layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // A UI that stopped listening is not the cart's problem.
        if self.tx.send(notice).is_err() {
            tracing::debug!(notice = notice.as_str(), "notice receiver dropped");
        }
    }
}
