//! HTTP middleware for the dashboard API: security headers, request
//! validation, rate limiting, optional bearer auth and the CSRF header check.

pub mod auth;
pub mod csrf;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;
pub mod validation;

pub use rate_limit::{EndpointRateLimiter, RateLimiter};
