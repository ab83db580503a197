//! # bt-api
//!
//! JSON API for BuildTrack.
//!
//! Every route except login, signup and the password reset pair requires
//! a bearer token or the session cookie. Handlers resolve the signed-in
//! user once and pass it to the services in `bt-services`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::{app, router};
