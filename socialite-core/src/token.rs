use crate::error::AuthError;
use crate::items::Items;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

const ACCESS_TOKEN: &str = "access_token";

/// A token response from a provider.
///
/// Always holds a non-empty `access_token` string; every other field of the
/// response is kept as an item.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    items: Items,
}

impl AccessToken {
    /// Build a token from a decoded token response.
    pub fn new(values: Map<String, Value>) -> Result<Self, AuthError> {
        validate(values.get(ACCESS_TOKEN))?;
        Ok(Self {
            items: Items::from(values),
        })
    }

    /// Build a token from a bare access token string obtained out-of-band.
    pub fn from_token(token: impl Into<String>) -> Result<Self, AuthError> {
        let mut values = Map::new();
        values.insert(ACCESS_TOKEN.to_string(), Value::String(token.into()));
        Self::new(values)
    }

    /// The access token string.
    pub fn token(&self) -> &str {
        self.items
            .get(ACCESS_TOKEN)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The refresh token, when the provider issued one.
    pub fn refresh_token(&self) -> Option<String> {
        self.items.get_str("refresh_token")
    }

    /// Lifetime of the token in seconds, when the provider reported it.
    /// Accepts both numeric and string encodings.
    pub fn expires_in(&self) -> Option<u64> {
        match self.items.get("expires_in")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a raw field of the token response.
    pub fn get_item(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    /// Get a raw scalar field of the token response as a string.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.items.get_str(key)
    }

    /// Set a raw field. Overwriting `access_token` is only allowed with a
    /// non-empty string.
    pub fn set_item(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self, AuthError> {
        let value = value.into();
        if key == ACCESS_TOKEN {
            validate(Some(&value))?;
        }
        self.items.set(key, value);
        Ok(self)
    }

    /// Borrow every field of the token response.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Export every field of the token response.
    pub fn to_map(&self) -> Map<String, Value> {
        self.items.to_map()
    }
}

fn validate(value: Option<&Value>) -> Result<(), AuthError> {
    match value {
        Some(Value::String(token)) if !token.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidArgument(
            "The key \"access_token\" could not be empty.".into(),
        )),
    }
}

impl TryFrom<Map<String, Value>> for AccessToken {
    type Error = AuthError;

    fn try_from(values: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}
