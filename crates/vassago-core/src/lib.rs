//! # Vassago Core
//!
//! Core types and errors for the Vassago ecosystem.
//!
//! This crate provides the foundational abstractions shared by every Vassago component:
//! - The unified error type
//! - Tracking identifiers and tracking records
//! - Timestamp rendering used on the wire

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
