//! Authentication for the Lichess API.
//!
//! Lichess accepts personal API tokens as bearer tokens. Most read endpoints
//! also work anonymously, so no token is required unless one is asked for
//! explicitly.
//!
//! # Example
//!
//! ```ignore
//! use liblichess::config::{AuthMethod, ClientConfig};
//!
//! // Use LICHESS_TOKEN if it is set, anonymous otherwise (default)
//! let config = ClientConfig::builder().build()?;
//!
//! // Require the environment variable
//! let config = ClientConfig::builder().token_from_env().build()?;
//!
//! // Explicit token, falling back to anonymous if it is empty
//! let config = ClientConfig::builder()
//!     .token("lip_...")
//!     .fallback(AuthMethod::None)
//!     .build()?;
//! ```

use std::fmt;

use crate::{Error, Result};

/// How requests are authenticated.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Send no credentials.
    None,
    /// Use a personal API token directly.
    Token(String),
    /// Read the token from `LICHESS_TOKEN`.
    TokenFromEnv,
    /// Use `LICHESS_TOKEN` if it is set, otherwise send no credentials.
    #[default]
    Auto,
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::None => f.write_str("None"),
            AuthMethod::Token(_) => f.write_str("Token(<redacted>)"),
            AuthMethod::TokenFromEnv => f.write_str("TokenFromEnv"),
            AuthMethod::Auto => f.write_str("Auto"),
        }
    }
}

/// Environment variable holding a personal API token.
pub const ENV_TOKEN: &str = "LICHESS_TOKEN";

/// Credentials ready to attach to requests.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum ResolvedAuth {
    Anonymous,
    Bearer(String),
}

impl ResolvedAuth {
    /// Value for the `Authorization` header, if any.
    pub fn authorization(&self) -> Option<String> {
        match self {
            ResolvedAuth::Anonymous => None,
            ResolvedAuth::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, ResolvedAuth::Anonymous)
    }
}

impl fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedAuth::Anonymous => f.write_str("Anonymous"),
            ResolvedAuth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Resolve an AuthMethod against the process environment.
pub(crate) fn resolve_auth(method: &AuthMethod, fallbacks: &[AuthMethod]) -> Result<ResolvedAuth> {
    resolve_auth_with(method, fallbacks, |var| std::env::var(var).ok())
}

/// Resolve an AuthMethod, trying fallbacks in order.
///
/// `lookup` reads environment variables.
pub(crate) fn resolve_auth_with<F>(
    method: &AuthMethod,
    fallbacks: &[AuthMethod],
    lookup: F,
) -> Result<ResolvedAuth>
where
    F: Fn(&str) -> Option<String>,
{
    for candidate in std::iter::once(method).chain(fallbacks) {
        if let Some(resolved) = try_resolve_single(candidate, &lookup) {
            tracing::debug!(method = ?candidate, auth = ?resolved, "resolved authentication");
            return Ok(resolved);
        }
    }

    let wanted_env = std::iter::once(method)
        .chain(fallbacks)
        .any(|m| *m == AuthMethod::TokenFromEnv);
    if wanted_env {
        Err(Error::EnvVarNotFound { var: ENV_TOKEN })
    } else {
        Err(Error::InvalidConfig("API token is empty".into()))
    }
}

/// Returns `None` if the method is unavailable.
fn try_resolve_single<F>(method: &AuthMethod, lookup: &F) -> Option<ResolvedAuth>
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = || {
        lookup(ENV_TOKEN)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    };

    match method {
        AuthMethod::None => Some(ResolvedAuth::Anonymous),
        AuthMethod::Token(token) if token.trim().is_empty() => None,
        AuthMethod::Token(token) => Some(ResolvedAuth::Bearer(token.trim().to_string())),
        AuthMethod::TokenFromEnv => from_env().map(ResolvedAuth::Bearer),
        AuthMethod::Auto => Some(from_env().map_or(ResolvedAuth::Anonymous, ResolvedAuth::Bearer)),
    }
}
