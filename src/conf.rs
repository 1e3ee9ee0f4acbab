//! Settings loaded from `CATERING_*` variables or a TOML file.

pub use catering_conf::*;
