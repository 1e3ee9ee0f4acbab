//! # Catering DB
//!
//! SQLite persistence for SEA Catering.
//!
//! Statements are built with `sea-query`, rendered for SQLite with bound
//! parameters and executed through an `sqlx` pool. Each aggregate has its
//! own repository:
//!
//! - [`UserRepository`]: accounts, unique by email
//! - [`PlanRepository`]: the seeded meal-plan catalog
//! - [`SubscriptionRepository`]: orders, the filtered list and lifecycle
//!   transitions written as compare-and-set updates
//! - [`TestimonialRepository`]: public reviews
//! - [`MetricsAggregator`]: admin dashboard figures
//!
//! ## Example
//!
//! ```
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use catering_db::{PlanRepository, connect_in_memory};
//!
//! let pool = connect_in_memory().await.unwrap();
//! let plans = PlanRepository::new(pool).list().await.unwrap();
//! assert_eq!(plans[0].id, "plan-kids");
//! # });
//! ```

pub mod bind;
pub mod metrics;
pub mod models;
pub mod plans;
pub mod pool;
pub mod query;
pub mod schema;
pub mod seed;
pub mod subscriptions;
pub mod testimonials;
pub mod time;
pub mod users;

pub use metrics::{AdminMetrics, DateWindow, MetricsAggregator};
pub use models::{MealPlan, Subscription, Testimonial, User};
pub use plans::PlanRepository;
pub use pool::{connect, connect_in_memory};
pub use query::{SortField, SortOrder, SubscriptionQuery};
pub use schema::migrate;
pub use seed::{MEAL_PLAN_CATALOG, seed_meal_plans};
pub use sqlx::SqlitePool;
pub use subscriptions::SubscriptionRepository;
pub use testimonials::TestimonialRepository;
pub use users::{NewUser, UserRepository};
