//! # Socialite Flow
//!
//! `socialite-flow` orchestrates the OAuth2 Authorization Code flow for social login providers.
//! It acts as the bridge between the provider dialects and the calling web application.
//!
//! ## Key Components
//!
//! - **[`OAuth2Flow`]**: Runs redirect → callback → exchange → fetch → map for one provider.
//! - **[`Redirect`]**: The authorize URL (and state) the caller sends the browser to.
//! - **[`Socialite`]**: Builds adapters from configuration by driver name and caches them.

#![warn(missing_docs)]

use log::debug;
use socialite_core::{
    AuthError, ClientCredentials, Config, HttpClient, HttpOptions, ProviderConfig, ReqwestClient,
    SocialProvider,
};
use std::collections::HashMap;
use std::sync::Arc;

/// OAuth2 Authorization Code flow implementation.
pub mod oauth2;
/// The redirect issued at the start of the flow.
pub mod redirect;

#[cfg(test)]
mod testing;

pub use oauth2::OAuth2Flow;
pub use redirect::Redirect;

/// Config key holding [`HttpOptions`] for the default HTTP client.
pub const HTTP_CONFIG_KEY: &str = "http";

/// Creates a fresh provider for a driver.
pub type ProviderFactory = Box<dyn Fn() -> Box<dyn SocialProvider> + Send + Sync>;

/// The adapter registry.
///
/// Adapters are built on first use from the config entry named after the
/// driver (`client_id`, `client_secret`, `redirect`) and cached for the
/// lifetime of the registry.
pub struct Socialite {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    factories: HashMap<String, ProviderFactory>,
    adapters: HashMap<String, OAuth2Flow>,
}

impl Socialite {
    /// Create a registry with no drivers registered.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            factories: HashMap::new(),
            adapters: HashMap::new(),
        }
    }

    /// Use `http` for every adapter instead of a `reqwest` client built from
    /// the `http` config key.
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Register a driver.
    pub fn extend<F, P>(mut self, driver: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: SocialProvider + 'static,
    {
        self.factories.insert(
            driver.into(),
            Box::new(move || Box::new(factory()) as Box<dyn SocialProvider>),
        );
        self
    }

    /// The registry configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the registered drivers.
    pub fn drivers(&self) -> Vec<&str> {
        let mut drivers: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        drivers.sort_unstable();
        drivers
    }

    /// Whether an adapter for `driver` has been built and cached.
    pub fn is_cached(&self, driver: &str) -> bool {
        self.adapters.contains_key(driver)
    }

    /// The adapter of the default driver. There is no default driver, so
    /// this always fails.
    pub fn default_adapter(&mut self) -> Result<&mut OAuth2Flow, AuthError> {
        Err(AuthError::InvalidArgument(
            "No Socialite adapter was specified.".into(),
        ))
    }

    /// Get the cached adapter for `driver`, building it on first use.
    pub fn adapter(&mut self, driver: &str) -> Result<&mut OAuth2Flow, AuthError> {
        if !self.adapters.contains_key(driver) {
            let adapter = self.build_adapter(driver)?;
            self.adapters.insert(driver.to_string(), adapter);
        }

        self.adapters
            .get_mut(driver)
            .ok_or_else(|| unsupported(driver))
    }

    /// Build a new, uncached adapter for `driver`.
    pub fn build_adapter(&self, driver: &str) -> Result<OAuth2Flow, AuthError> {
        let factory = self.factories.get(driver).ok_or_else(|| unsupported(driver))?;

        let config: ProviderConfig = self.config.get_as(driver)?.ok_or_else(|| {
            AuthError::InvalidArgument(format!("No configuration found for adapter [{driver}]."))
        })?;

        let credentials =
            ClientCredentials::new(config.client_id, config.client_secret, config.redirect);
        let http = self.http_client()?;
        debug!("Building {driver} adapter");

        Ok(OAuth2Flow::from_boxed(factory(), credentials, http))
    }

    fn http_client(&self) -> Result<Arc<dyn HttpClient>, AuthError> {
        if let Some(http) = &self.http {
            return Ok(http.clone());
        }
        let options: HttpOptions = self.config.get_as(HTTP_CONFIG_KEY)?.unwrap_or_default();
        Ok(Arc::new(ReqwestClient::new(&options)?))
    }
}

fn unsupported(driver: &str) -> AuthError {
    AuthError::InvalidArgument(format!("Adapter [{driver}] not supported."))
}
