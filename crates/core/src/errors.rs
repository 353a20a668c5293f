use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::ProductId;
use crate::session::SessionRequirement;

/// Recoverable outcomes of store operations. None of these abort the process;
/// the caller decides how to present them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} `{key}` was not found")]
    NotFound { entity: &'static str, key: String },
    #[error("{entity} `{key}` already exists")]
    DuplicateKey { entity: &'static str, key: String },
    #[error("browsing history is full ({capacity} categories)")]
    BufferFull { capacity: usize },
    #[error("no browsing history to recommend from")]
    EmptyHistory,
    #[error(
        "insufficient inventory for product `{product_id}`: requested {requested}, available {available}"
    )]
    InsufficientInventory { product_id: ProductId, requested: u32, available: u32 },
    #[error("`{operation}` requires the session to be {required}")]
    InvalidSessionState { operation: &'static str, required: SessionRequirement },
    #[error("invalid user id or secret")]
    InvalidCredentials,
    #[error("purchase quantity must be greater than zero")]
    InvalidQuantity,
    #[error("product price must not be negative (got {price})")]
    InvalidPrice { price: Decimal },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound { entity, key: key.to_string() }
    }

    pub(crate) fn duplicate(entity: &'static str, key: impl ToString) -> Self {
        Self::DuplicateKey { entity, key: key.to_string() }
    }

    /// Stable machine-readable class, used in structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::BufferFull { .. } => "buffer_full",
            Self::EmptyHistory => "empty_history",
            Self::InsufficientInventory { .. } => "insufficient_inventory",
            Self::InvalidSessionState { .. } => "invalid_session_state",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidQuantity => "invalid_quantity",
            Self::InvalidPrice { .. } => "invalid_price",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "The requested record was not found.",
            Self::DuplicateKey { .. } => "A record with that ID already exists.",
            Self::BufferFull { .. } => "Browsing history is full. Cannot track more categories.",
            Self::EmptyHistory => "You should browse for recommendations.",
            Self::InsufficientInventory { .. } => "Insufficient inventory for that purchase.",
            Self::InvalidSessionState { operation: "logout", .. } => {
                "No user is currently logged in."
            }
            Self::InvalidSessionState { operation: "login", .. } => {
                "A user is already logged in. Log out first."
            }
            Self::InvalidSessionState { required: SessionRequirement::LoggedIn, .. } => {
                "Please log in first."
            }
            Self::InvalidSessionState { required: SessionRequirement::LoggedOut, .. } => {
                "Please log out first."
            }
            Self::InvalidCredentials => "Invalid ID or password.",
            Self::InvalidQuantity => "Quantity must be at least one.",
            Self::InvalidPrice { .. } => "Price must not be negative.",
        }
    }
}
