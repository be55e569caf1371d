use crate::error::AuthError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Layered settings store.
///
/// A config is an ordered chain of layers checked front-to-back. The first
/// layer holds the local settings; the remaining layers form the fallback
/// chain. Layers are shared immutably, so writes through [`Config::set`]
/// never reach a fallback.
#[derive(Debug, Clone)]
pub struct Config {
    layers: Vec<Arc<Map<String, Value>>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

impl Config {
    /// Create a config with the given local settings and no fallback.
    pub fn new(settings: Map<String, Value>) -> Self {
        Self {
            layers: vec![Arc::new(settings)],
        }
    }

    /// Create a config whose fallback is `parent`.
    pub fn layered(settings: Map<String, Value>, parent: &Config) -> Result<Self, AuthError> {
        let mut config = Self::new(settings);
        config.set_fallback(parent)?;
        Ok(config)
    }

    /// The local settings, without any fallback values.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.layers[0]
    }

    /// Number of layers in the chain, the local one included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Look up `key` locally, then along the fallback chain.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// Look up `key`, returning `default` when no layer has it.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Deserialize the value stored under `key`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AuthError> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    AuthError::InvalidArgument(format!("Invalid config value for [{key}]: {e}"))
                })
            })
            .transpose()
    }

    /// Whether `key` is set locally or in any fallback.
    pub fn has(&self, key: &str) -> bool {
        self.layers.iter().any(|layer| layer.contains_key(key))
    }

    /// Write `key` to the local settings.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self, AuthError> {
        if key.is_empty() {
            return Err(AuthError::InvalidArgument("Invalid config key.".into()));
        }
        Arc::make_mut(&mut self.layers[0]).insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Replace the fallback chain with `fallback` (and its own fallbacks).
    ///
    /// Fails when the resulting chain would visit the same layer twice.
    pub fn set_fallback(&mut self, fallback: &Config) -> Result<&mut Self, AuthError> {
        let local = &self.layers[0];
        for (i, layer) in fallback.layers.iter().enumerate() {
            let revisits = Arc::ptr_eq(layer, local)
                || fallback.layers[..i].iter().any(|seen| Arc::ptr_eq(seen, layer));
            if revisits {
                return Err(AuthError::InvalidArgument(
                    "Config fallback chain would revisit itself.".into(),
                ));
            }
        }

        self.layers.truncate(1);
        self.layers.extend(fallback.layers.iter().cloned());
        Ok(self)
    }

    /// Drop the fallback chain, keeping only the local settings.
    pub fn clear_fallback(&mut self) -> &mut Self {
        self.layers.truncate(1);
        self
    }
}

impl From<Map<String, Value>> for Config {
    fn from(settings: Map<String, Value>) -> Self {
        Self::new(settings)
    }
}

impl TryFrom<Value> for Config {
    type Error = AuthError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(settings) => Ok(Self::new(settings)),
            other => Err(AuthError::InvalidArgument(format!(
                "A config should either be an object or null, got {other}"
            ))),
        }
    }
}

/// Credentials for one driver, as found under the driver's config key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The application id issued by the provider.
    #[serde(alias = "identifier")]
    pub client_id: String,
    /// The application secret issued by the provider.
    #[serde(alias = "secret")]
    pub client_secret: String,
    /// Where the provider sends the user back to.
    #[serde(default, alias = "callback_uri")]
    pub redirect: Option<String>,
}

impl ProviderConfig {
    /// Create a new provider config.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect,
        }
    }

    /// Read `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and the optional
    /// `<PREFIX>_REDIRECT` from the environment.
    pub fn from_env(prefix: &str) -> Result<Self, AuthError> {
        let var = |name: &str| std::env::var(format!("{prefix}_{name}"));
        let required = |name: &str| {
            var(name).map_err(|_| {
                AuthError::InvalidArgument(format!("Missing environment variable {prefix}_{name}"))
            })
        };

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            redirect: var("REDIRECT").ok(),
        })
    }
}

/// Options for the default HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether TLS certificates are verified.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
        }
    }
}

impl HttpOptions {
    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
