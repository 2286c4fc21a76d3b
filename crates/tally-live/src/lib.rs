//! Live push channels for Tally.
//!
//! A [`ConnectionRegistry`] tracks the open subscriber handles of every
//! tenant; a [`Dispatcher`] serialises events once and fans them out to a
//! tenant's handles, pruning any that can no longer be delivered to.
//!
//! Handles are bounded channels drained by the transport (the websocket
//! task in `tally-server`), so delivery here never blocks.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::{ConnectionRegistry, DeliveryError, Subscriber};
