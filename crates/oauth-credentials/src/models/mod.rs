//! Data model shared by the engine components.
//!
//! Records are plain values: the cache stores them by value and the
//! lifecycle calculator hands back modified copies instead of mutating.

mod app;
mod credential;
mod token;
mod user;

pub use app::AppMetadata;
pub use credential::{CachedPrincipal, ClientCredential};
pub use token::AccessTokenRecord;
pub use user::AuthenticatedUser;
