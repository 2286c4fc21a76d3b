//! Core types, policies and the inventory engine for Tally.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::InventoryStore`]; push-channel
//! transports implement [`engine::EventSink`].

pub mod alert;
pub mod engine;
pub mod error;
pub mod event;
pub mod forecast;
pub mod product;
pub mod stock;
pub mod store;
pub mod tenant;

pub use error::{Error, Result};
