//! # Catering Core
//!
//! Domain layer of SEA Catering: the error taxonomy, the enumerations that
//! appear on the wire, payload validation, the subscription pricing engine
//! and the subscription lifecycle state machine.
//!
//! Nothing in this crate performs I/O. Storage lives in `catering-db`, the
//! HTTP surface in `catering-server`.
//!
//! ## Quick Start
//!
//! ```rust
//! use catering_core::lifecycle::{LifecycleState, Transition};
//! use catering_core::pricing::monthly_price;
//! use catering_core::SubscriptionStatus;
//!
//! let price = monthly_price(30000, 2, 3);
//! assert_eq!(price, rust_decimal::Decimal::from(774000));
//!
//! let next = LifecycleState::active().apply(Transition::Cancel).unwrap();
//! assert_eq!(next.status, SubscriptionStatus::Cancelled);
//! ```

pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{DUPLICATE_RESOURCE, Error, FieldError, Result, ValidationErrors};
pub use lifecycle::{LifecycleState, PauseWindow, Transition};
pub use pricing::{WEEKS_PER_MONTH, monthly_price};
pub use types::{DeliveryDay, MealType, Role, SubscriptionStatus};
