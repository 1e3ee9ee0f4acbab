//! SQLite persistence: schema, seed catalog, repositories and admin metrics.

pub use catering_db::*;
