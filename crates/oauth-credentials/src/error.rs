//! Error types for the credential engine.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Expected negatives (wrong secret, unknown client, PKCE mismatch) are ordinary
//! return values and never appear here.

/// Failures reported by a backing store collaborator.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Store could not be reached (connection refused, pool exhausted, timeout).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with an error.
    #[error("Store error: {message}")]
    Backend {
        /// Error message from the store
        message: String,
    },
}

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }
}

/// Failure to write into the cache. Never fatal to the caller.
#[derive(thiserror::Error, Debug)]
#[error("Cache write failed: {message}")]
pub struct CacheError {
    /// What went wrong
    pub message: String,
}

impl CacheError {
    /// Create a cache error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// PKCE policy violations (RFC 7636).
///
/// Each variant is a distinct reason so the authorization server can emit a
/// precise error response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PkceError {
    /// PKCE is mandatory for the application and no verifier was sent.
    #[error("No PKCE code verifier found. PKCE is mandatory for this application")]
    MissingVerifier,

    /// The authorization code was bound to a challenge but the verifier is empty.
    #[error("Empty PKCE code_verifier sent. This authorization code requires PKCE verification")]
    VerifierRequired,

    /// Verifier violates the RFC 7636 character set or length bounds.
    #[error("Code verifier is not up to RFC 7636 specifications")]
    MalformedVerifier,

    /// The application does not allow the `plain` transformation.
    #[error("This application does not allow the 'plain' transformation algorithm")]
    PlainNotAllowed,

    /// Unknown `code_challenge_method`.
    #[error("Invalid PKCE code challenge method '{method}'")]
    UnsupportedMethod {
        /// The method as received
        method: String,
    },

    /// Challenge sent at authorization time does not fit its method.
    #[error("Code challenge is not up to RFC 7636 specifications")]
    InvalidChallenge,
}

impl PkceError {
    /// Create an unsupported method error.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod { method: method.into() }
    }

    /// RFC 6749 error code for this violation.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingVerifier | Self::InvalidChallenge | Self::UnsupportedMethod { .. } => {
                "invalid_request"
            }
            Self::VerifierRequired | Self::MalformedVerifier | Self::PlainNotAllowed => {
                "invalid_grant"
            }
        }
    }
}

/// Errors from the credential engine.
#[derive(thiserror::Error, Debug)]
pub enum OAuthError {
    /// Backing store failure
    #[error("Backing store error: {0}")]
    Store(#[from] StoreError),

    /// Fatal misconfiguration (malformed domain mapping, invalid skew, ...)
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is misconfigured
        message: String,
    },

    /// Input that violates the caller contract
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// Offending argument
        argument: String,
        /// Why it is invalid
        message: String,
    },

    /// PKCE policy violation
    #[error("PKCE validation failed: {0}")]
    Pkce(#[from] PkceError),

    /// Token identifier unknown to the token store
    #[error("Invalid access token")]
    InvalidToken,

    /// No application registered under the client id
    #[error("Cannot find an application associated with the given consumer key: {client_id}")]
    UnknownApplication {
        /// Client id that was looked up
        client_id: String,
    },
}

impl OAuthError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument { argument: argument.into(), message: message.into() }
    }

    /// Create an unknown application error.
    #[must_use]
    pub fn unknown_application(client_id: impl Into<String>) -> Self {
        Self::UnknownApplication { client_id: client_id.into() }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable(_)))
    }

    /// RFC 6749 error code to put in the `error` field of a response.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Pkce(e) => e.error_code(),
            Self::InvalidToken => "invalid_grant",
            Self::UnknownApplication { .. } => "invalid_client",
            Self::InvalidArgument { .. } => "invalid_request",
            Self::Store(StoreError::Unavailable(_)) => "temporarily_unavailable",
            Self::Store(_) | Self::Configuration { .. } => "server_error",
        }
    }
}

/// Result type alias for engine operations.
pub type OAuthResult<T> = Result<T, OAuthError>;
