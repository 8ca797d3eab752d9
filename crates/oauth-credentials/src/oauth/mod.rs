//! OAuth 2.0 credential and token components.
//!
//! - [`authenticator`]: client secret verification and owner resolution
//! - [`pkce`]: RFC 7636 verifier and challenge checks
//! - [`lifecycle`]: token validity with clock skew
//! - [`scope`]: scope canonicalization and hashing
//! - [`lookup`] / [`app_info`]: cache-aside token and application lookups
//! - [`exchange`]: authorization code exchange validation
//! - [`partition`]: per user store access token tables

pub mod app_info;
pub mod authenticator;
pub mod context;
pub mod exchange;
pub mod lifecycle;
pub mod lookup;
pub mod partition;
pub mod pkce;
pub mod scope;

pub use app_info::AppInfoResolver;
pub use authenticator::ClientAuthenticator;
pub use context::{AuthorizationRequestContext, TokenRequestContext};
pub use exchange::{AuthorizationCodeBinding, CodeExchangeValidator, ExchangeDecision, Grant, RejectReason};
pub use lifecycle::{Remaining, TokenLifecycleCalculator};
pub use lookup::TokenLookupService;
pub use partition::DomainMappings;
pub use pkce::{PkceChallenge, PkceMethod, PkcePolicy};
