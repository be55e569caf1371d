use crate::items::{scalar_to_string, Items};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized social user.
///
/// The five profile fields are copied once, at construction, from the
/// normalized attributes produced by an adapter. The provider's untouched
/// payload is kept in [`User::raw`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: Option<String>,
    nickname: Option<String>,
    name: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
    #[serde(default)]
    attributes: Items,
    #[serde(default)]
    raw: Map<String, Value>,
    token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl User {
    /// Create a user from normalized attributes (`id`, `nickname`, `name`,
    /// `email`, `avatar`). Unknown keys are kept as attributes only.
    pub fn new(attributes: Map<String, Value>) -> Self {
        let attributes = Items::from(attributes);
        Self {
            id: attributes.get_str("id"),
            nickname: attributes.get_str("nickname"),
            name: attributes.get_str("name"),
            email: attributes.get_str("email"),
            avatar: attributes.get_str("avatar"),
            attributes,
            ..Default::default()
        }
    }

    /// Attach the provider's raw payload.
    pub fn with_raw(mut self, raw: Map<String, Value>) -> Self {
        self.raw = raw;
        self
    }

    /// The provider's unique identifier for the user.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The nickname / username.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// The full name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The e-mail address, when the provider shares it.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The avatar image URL.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// The normalized attributes the user was built from.
    pub fn attributes(&self) -> &Items {
        &self.attributes
    }

    /// The provider's raw payload.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Get a field of the raw payload.
    pub fn raw_get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Set a field of the raw payload. Normalized fields are not affected.
    pub fn raw_set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.raw.insert(key.into(), value.into());
    }

    /// Whether the raw payload has `key`.
    pub fn raw_has(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    /// Remove a field from the raw payload.
    pub fn raw_remove(&mut self, key: &str) -> Option<Value> {
        self.raw.remove(key)
    }

    /// The access token the user was fetched with.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The refresh token, when the provider issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Seconds the access token is valid for.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Attach the access token.
    pub fn set_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    /// Attach the refresh token.
    pub fn set_refresh_token(&mut self, refresh_token: Option<String>) -> &mut Self {
        self.refresh_token = refresh_token;
        self
    }

    /// Attach the token lifetime in seconds.
    pub fn set_expires_in(&mut self, expires_in: Option<u64>) -> &mut Self {
        self.expires_in = expires_in;
        self
    }
}

/// Copy the value at `path` of a raw payload into a normalized attribute.
///
/// Missing values become `null`; numbers are stringified.
pub fn map_field(raw: &Items, path: &str) -> Value {
    raw.get_path(path)
        .and_then(scalar_to_string)
        .map(Value::String)
        .unwrap_or(Value::Null)
}
