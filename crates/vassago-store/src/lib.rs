//! # Vassago Store
//!
//! *"The Prince finds what was lost and hidden"*
//!
//! Tracking record storage for the Vassago ecosystem.
//!
//! ## Features
//!
//! - **Store Interface**: [`TrackingStore`] keeps endpoint logic independent of the backend
//! - **In-Memory Backend**: lock-guarded map with a recipient index for sublinear lookup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::{InMemoryStore, TrackingStore};
