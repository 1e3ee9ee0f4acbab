//! HTTP server, router, views and management commands.
//!
//! Available with the `server` feature.

pub use catering_server::*;
