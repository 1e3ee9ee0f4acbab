//! # Catering HTTP
//!
//! Framework-level HTTP types shared by the middleware and server crates:
//!
//! - [`Request`] / [`Response`]: owned request and response values with
//!   query, path-parameter, cookie and JSON helpers
//! - [`Extensions`]: typed request-scoped storage
//! - [`Handler`] / [`Middleware`] / [`MiddlewareChain`]: the processing
//!   pipeline
//! - [`cookie`]: `Cookie` parsing and `Set-Cookie` building

pub mod cookie;
pub mod extensions;
pub mod middleware;
pub mod request;
pub mod response;

pub use cookie::{SameSite, SetCookie, parse_cookie_header};
pub use extensions::Extensions;
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
