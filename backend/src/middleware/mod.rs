//! HTTP middleware
//!
//! Cross-cutting request handling: per-IP rate limiting and security
//! response headers. Tracing, CORS, compression and timeouts come from
//! tower-http layers wired up in the router.

pub mod rate_limit;
pub mod security;

pub use rate_limit::{auth_rate_limit, general_rate_limit, RateLimiter};
pub use security::security_headers;
