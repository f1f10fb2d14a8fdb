//! # Vassago Server
//!
//! HTTP API for sending tracking emails, serving the tracking pixel and
//! reporting opens.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/send-email` | Send a tracking email to `{"email": ...}` |
//! | `GET` | `/track/{id}` | Serve the pixel and record an open |
//! | `GET` | `/report/{email}` | Open count for a recipient |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/status` | Uptime, record count and counters |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
mod handlers;
pub mod pixel;
pub mod server;

pub use server::{router, AppState, Server, ServerConfig};
