//! # Catering Conf
//!
//! Runtime settings. Every value has a development default and can be
//! overridden by a TOML file and by `CATERING_*` environment variables.
//!
//! ```
//! use catering_conf::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.bind_address, "127.0.0.1:8000");
//! assert_eq!(settings.token_ttl().as_secs(), 3600);
//! assert!(!settings.production);
//! ```

pub mod env;
pub mod settings;

pub use env::{Env, EnvError};
pub use settings::{ENV_PREFIX, FALLBACK_JWT_SECRET, MAX_TOKEN_TTL_SECS, Settings};
