//! SQLite backend for the Tally inventory store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That thread owns the only
//! connection, so every closure passed to it runs in isolation from every
//! other; stock changes additionally run inside a transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
