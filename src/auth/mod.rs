//! Bearer token authentication.
//!
//! Users log in with their username and password to receive a signed token,
//! and the [auth_guard] middleware checks that token on every protected route.

mod log_in;
mod middleware;
mod token;

pub use log_in::log_in_endpoint;
pub use middleware::auth_guard;
