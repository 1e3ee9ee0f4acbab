//! Request, response, cookies and the handler/middleware traits.

pub use catering_http::*;
