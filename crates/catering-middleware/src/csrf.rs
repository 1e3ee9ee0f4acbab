use async_trait::async_trait;
use catering_core::{Error, Result};
use catering_http::{Handler, Middleware, Request, Response, SameSite, SetCookie};
use hyper::Method;
use std::sync::Arc;

/// Number of random bytes in a token; hex encoding doubles the length.
pub const TOKEN_BYTES: usize = 32;

/// Double-submit cookie settings
#[derive(Debug, Clone)]
pub struct CsrfConfig {
	pub cookie_name: String,
	pub header_name: String,
	pub cookie_secure: bool,
	pub cookie_httponly: bool,
	pub cookie_samesite: SameSite,
	pub cookie_path: String,
	pub cookie_max_age: i64,
}

impl Default for CsrfConfig {
	fn default() -> Self {
		Self {
			cookie_name: "csrfToken".to_string(),
			header_name: "CSRF-Token".to_string(),
			cookie_secure: false,
			cookie_httponly: true,
			cookie_samesite: SameSite::Lax,
			cookie_path: "/".to_string(),
			cookie_max_age: 3600,
		}
	}
}

impl CsrfConfig {
	/// Production settings: same as default plus the `Secure` attribute
	///
	/// # Examples
	///
	/// ```
	/// use catering_middleware::CsrfConfig;
	///
	/// let config = CsrfConfig::production();
	/// assert!(config.cookie_secure);
	/// assert_eq!(config.header_name, "CSRF-Token");
	/// ```
	pub fn production() -> Self {
		Self {
			cookie_secure: true,
			..Self::default()
		}
	}

	/// Cookie carrying a freshly minted token
	pub fn cookie(&self, token: &str) -> SetCookie {
		SetCookie::new(&self.cookie_name, token)
			.path(&self.cookie_path)
			.secure(self.cookie_secure)
			.http_only(self.cookie_httponly)
			.same_site(self.cookie_samesite)
			.max_age(self.cookie_max_age)
	}
}

/// Mint a token: 32 bytes from the OS RNG, hex encoded
pub fn generate_token() -> String {
	use rand::RngCore;

	let mut bytes = [0u8; TOKEN_BYTES];
	rand::rngs::OsRng.fill_bytes(&mut bytes);
	hex::encode(bytes)
}

/// Compare the header token with the cookie token.
///
/// Both sides must be present and non-empty. Inputs are hashed first so the
/// comparison time leaks neither content nor length.
///
/// # Examples
///
/// ```
/// use catering_middleware::csrf::tokens_match;
///
/// assert!(tokens_match(Some("abc"), Some("abc")));
/// assert!(!tokens_match(Some("abc"), Some("abd")));
/// assert!(!tokens_match(None, Some("abc")));
/// assert!(!tokens_match(Some(""), Some("")));
/// ```
pub fn tokens_match(header: Option<&str>, cookie: Option<&str>) -> bool {
	use sha2::{Digest, Sha256};
	use subtle::ConstantTimeEq;

	match (header, cookie) {
		(Some(header), Some(cookie)) if !header.is_empty() && !cookie.is_empty() => {
			let a = Sha256::digest(header.as_bytes());
			let b = Sha256::digest(cookie.as_bytes());
			a.ct_eq(&b).into()
		}
		_ => false,
	}
}

/// Check a request's header token against its cookie token
pub fn verify_request(request: &Request, config: &CsrfConfig) -> Result<()> {
	let header = request.header(&config.header_name);
	let cookie = request.cookie(&config.cookie_name);

	if tokens_match(header, cookie.as_deref()) {
		Ok(())
	} else {
		tracing::warn!(
			path = %request.path(),
			header_present = header.is_some(),
			cookie_present = cookie.is_some(),
			"CSRF token mismatch"
		);
		Err(Error::Csrf)
	}
}

/// Rejects state-changing requests on guarded paths unless the
/// `CSRF-Token` header echoes the `csrfToken` cookie.
///
/// Runs before the handler, so a rejected request never reaches storage.
pub struct CsrfMiddleware {
	config: CsrfConfig,
	guarded_prefixes: Vec<String>,
}

impl CsrfMiddleware {
	pub fn new(config: CsrfConfig) -> Self {
		Self {
			config,
			guarded_prefixes: Vec::new(),
		}
	}

	/// Guard every unsafe request whose path starts with `prefix`
	pub fn guard(mut self, prefix: impl Into<String>) -> Self {
		self.guarded_prefixes.push(prefix.into());
		self
	}

	pub fn config(&self) -> &CsrfConfig {
		&self.config
	}

	fn is_unsafe(method: &Method) -> bool {
		!matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
	}
}

#[async_trait]
impl Middleware for CsrfMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if let Err(err) = verify_request(&request, &self.config) {
			return Ok(Response::from_error(&err, "Invalid CSRF token."));
		}
		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		Self::is_unsafe(&request.method)
			&& self
				.guarded_prefixes
				.iter()
				.any(|prefix| request.path().starts_with(prefix.as_str()))
	}
}
