//! # Socialite Core
//!
//! `socialite-core` provides the foundational traits and types for the Socialite social login library.
//! It defines the provider capability trait, the token and user records every provider produces,
//! and the collaborator seams (HTTP, session, callback request) the flow runs against.

#![warn(missing_docs)]

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Errors that can occur during the authentication process.
pub mod error;
pub use crate::error::AuthError;

/// Key/value bag with dot-path lookup.
pub mod items;
pub use crate::items::Items;

/// Layered settings and provider configuration.
pub mod config;
pub use crate::config::{Config, HttpOptions, ProviderConfig};

/// The access token returned by a provider.
pub mod token;
pub use crate::token::AccessToken;

/// The normalized user record.
pub mod user;
pub use crate::user::User;

/// HTTP transport abstraction and its `reqwest` implementation.
pub mod http;
pub use crate::http::{HttpClient, HttpRequest, ReqwestClient};

/// Session and callback request abstractions.
pub mod session;
pub use crate::session::{CallbackRequest, SessionStore};

pub mod oauth2;
pub use crate::oauth2::{AuthorizationRequest, ClientCredentials};

/// The capabilities a social login provider supplies to the flow.
///
/// A provider is stateless apart from its endpoints; credentials, scopes and
/// extra parameters are owned by the flow and passed in on every call.
#[async_trait]
pub trait SocialProvider: Send + Sync {
    /// Get the provider identifier (the driver name).
    fn provider_id(&self) -> &str;

    /// Scopes requested when the caller configures none.
    fn default_scopes(&self) -> Vec<String>;

    /// Whether the provider skips the session `state` check by default.
    fn stateless_by_default(&self) -> bool {
        false
    }

    /// The character(s) joining requested scopes.
    fn scope_separator(&self) -> &str {
        ","
    }

    /// Build the URL the user is redirected to.
    fn authorize_url(&self, request: &AuthorizationRequest<'_>) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessToken, AuthError>;

    /// Fetch the raw user profile.
    async fn fetch_profile(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        token: &AccessToken,
    ) -> Result<Map<String, Value>, AuthError>;

    /// Map the raw profile to normalized attributes
    /// (`id`, `nickname`, `name`, `email`, `avatar`).
    fn map_profile(&self, raw: &Items) -> Map<String, Value>;

    /// Refresh an access token.
    async fn refresh_token(
        &self,
        _http: &dyn HttpClient,
        _credentials: &ClientCredentials,
        _token: &AccessToken,
    ) -> Result<AccessToken, AuthError> {
        Err(AuthError::Unsupported(
            "Token refresh not supported by this provider".into(),
        ))
    }
}
