// Authentication module
// Session exchange and single-slot credential caching

mod claims;
mod manager;
mod session;
mod types;

pub use claims::{session_lifetime, unverified_expiry, MIN_LIFETIME_SECS, SAFETY_MARGIN_SECS};
pub use manager::CredentialCache;
pub use session::SESSION_PATH;
pub use types::{Credential, StaticCredentials};
