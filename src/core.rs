//! Domain vocabulary: errors, enums, pricing, lifecycle and input validation.
//!
//! # Examples
//!
//! ```rust
//! use catering::core::{PauseWindow, monthly_price};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
//! let window = PauseWindow::parse("2025-06-12", "2025-06-20", today).unwrap();
//! assert_eq!(window.days(), 9);
//! assert_eq!(monthly_price(30000, 2, 3), Decimal::from(774_000));
//! ```

pub use catering_core::*;
