//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A product, stock record or alert is absent or belongs to another tenant.
  #[error("{what} not found")]
  NotFound { what: String },

  #[error("insufficient stock: available {available}, requested {requested}")]
  InsufficientStock { available: i64, requested: i64 },

  #[error("invalid {field}: {reason}")]
  InvalidInput { field: &'static str, reason: String },

  /// The product exists but has nothing a forecast can be computed from.
  #[error("cannot forecast product {0}: no stock record")]
  Insufficient(Uuid),

  #[error("product with barcode {0:?} already exists")]
  DuplicateBarcode(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(what: impl Into<String>) -> Self {
    Self::NotFound { what: what.into() }
  }

  pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
    Self::InvalidInput { field, reason: reason.into() }
  }

  /// Wrap a backend error. Used as `.map_err(Error::storage)`.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
