//! Configuration and authentication for the Lichess client.
//!
//! This module provides:
//!
//! - [`ClientConfig`] and [`ClientConfigBuilder`] for configuring the client
//! - [`AuthMethod`] for specifying authentication
//! - Option structs mapped to query strings through [`QueryOptions`]
//!
//! # Example
//!
//! ```ignore
//! use liblichess::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .token("lip_...")
//!     .base_url("http://localhost:9663/")
//!     .build()?;
//! ```

pub mod auth;
pub mod builder;
pub mod options;

// Re-export commonly used types
pub use auth::{AuthMethod, ENV_TOKEN};
pub use builder::{
    ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_STREAM_BUFFER, DEFAULT_USER_AGENT,
};
pub(crate) use options::append_query;
pub use options::{
    Color, ExportByIdOptions, ExportByUsernameOptions, PuzzleActivityOptions, QueryOptions,
    SortOrder, StreamGamesOfUsersOptions,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_exports_accessible() {
        let _: AuthMethod = AuthMethod::Auto;
        let _: &str = ENV_TOKEN;
        let _: &str = DEFAULT_BASE_URL;
        let _ = ExportByIdOptions::default();
        let _ = ExportByUsernameOptions::default();
        let _ = StreamGamesOfUsersOptions::default();
        let _ = PuzzleActivityOptions::default();
        let _ = SortOrder::default();
        let _ = Color::White;
    }

    #[test]
    fn builder_accessible() {
        let _ = ClientConfig::builder();
    }
}
