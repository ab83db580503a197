//! # bt-auth
//!
//! Authentication for BuildTrack.
//!
//! ## Features
//!
//! - JWT bearer tokens bound to a server-side session
//! - Session cookies
//! - Argon2 password hashing
//! - Single-use password reset tokens (SHA-256 digests at rest)
//! - `CurrentUser`, the per-request identity every contract and service receives

pub mod current_user;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod session;

pub use current_user::CurrentUser;
pub use identity::{AuthError, AuthStrategy, Authenticator, Identity, RequestHeaders, SignedIn};
pub use jwt::{Claims, JwtError, JwtService};
pub use password::{
    hash_password, issue_reset_token, token_digest, verify_password, verify_without_account,
    IssuedResetToken,
};
pub use session::{CookieConfig, MemorySessionStore, Session, SessionError, SessionStore};
