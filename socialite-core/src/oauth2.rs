//! Request and response shaping shared by the OAuth2 dialects.

use crate::error::AuthError;
use crate::token::AccessToken;
use base64::Engine;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// The application credentials an adapter was configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Application id.
    pub client_id: String,
    /// Application secret.
    pub client_secret: String,
    /// Callback URL registered with the provider.
    pub redirect_url: Option<String>,
}

impl ClientCredentials {
    /// Create a new set of credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url,
        }
    }

    /// The standard authorization code exchange fields.
    pub fn token_fields(&self, code: &str) -> Vec<(String, String)> {
        vec![
            ("client_id".into(), self.client_id.clone()),
            ("client_secret".into(), self.client_secret.clone()),
            ("code".into(), code.into()),
            (
                "redirect_uri".into(),
                self.redirect_url.clone().unwrap_or_default(),
            ),
        ]
    }
}

/// Everything needed to build an authorize URL.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    /// Application id.
    pub client_id: &'a str,
    /// Callback URL.
    pub redirect_uri: Option<&'a str>,
    /// Requested scopes.
    pub scopes: &'a [String],
    /// Extra query parameters, overriding the standard ones.
    pub parameters: &'a BTreeMap<String, String>,
    /// Anti-forgery state, `None` when running stateless.
    pub state: Option<&'a str>,
}

impl AuthorizationRequest<'_> {
    /// Join the scopes with `separator`.
    pub fn scope(&self, separator: &str) -> String {
        self.scopes.join(separator)
    }

    /// The standard authorization code request fields: `client_id`,
    /// `redirect_uri`, `scope`, `response_type`, the extra parameters and,
    /// when present, `state`.
    pub fn code_fields(&self, separator: &str) -> Vec<(String, String)> {
        let mut fields = vec![
            ("client_id".into(), self.client_id.to_string()),
            (
                "redirect_uri".into(),
                self.redirect_uri.unwrap_or_default().to_string(),
            ),
            ("scope".into(), self.scope(separator)),
            ("response_type".into(), "code".into()),
        ];
        merge_fields(
            &mut fields,
            self.parameters.iter().map(|(k, v)| (k.clone(), v.clone())),
        );
        if let Some(state) = self.state {
            merge_fields(&mut fields, [("state".to_string(), state.to_string())]);
        }
        fields
    }
}

/// Merge `extra` into `fields`; an existing key is overwritten in place,
/// new keys are appended.
pub fn merge_fields<I>(fields: &mut Vec<(String, String)>, extra: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in extra {
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => field.1 = value,
            None => fields.push((key, value)),
        }
    }
}

/// `base?<form-encoded fields>`.
pub fn build_url(base: &str, fields: &[(String, String)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    format!("{base}?{query}")
}

/// Generate an unguessable anti-forgery state value (256 random bits,
/// base64url encoded).
pub fn generate_state() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a body that must be a JSON object.
pub fn parse_json_object(body: &str) -> Result<Map<String, Value>, AuthError> {
    match serde_json::from_str::<Value>(body.trim())? {
        Value::Object(map) => Ok(map),
        other => Err(AuthError::Parse(format!(
            "Expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

/// Decode an `a=1&b=2` body. Values stay strings.
pub fn parse_query_string(body: &str) -> Map<String, Value> {
    form_urlencoded::parse(body.trim().as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

/// Strip a JSONP `callback( ... );` envelope, if the body is wrapped in one.
pub fn strip_callback(body: &str) -> &str {
    let Some(rest) = body.trim_start().strip_prefix("callback") else {
        return body;
    };
    let Some(inner) = rest.trim_start().strip_prefix('(') else {
        return body;
    };
    match inner.rfind(')') {
        Some(right) => inner[..right].trim(),
        None => body,
    }
}

/// Whether the body is wrapped in a JSONP `callback( ... );` envelope.
pub fn is_callback(body: &str) -> bool {
    strip_callback(body).len() != body.len()
}

/// Extract a standard OAuth2 error (`error` + `error_description`) from a
/// decoded response.
pub fn oauth_error(map: &Map<String, Value>) -> Option<String> {
    let error = map.get("error")?;
    let error = error
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    match map.get("error_description").and_then(Value::as_str) {
        Some(description) => Some(format!("{error}: {description}")),
        None => Some(error),
    }
}

/// Turn a decoded token response into an [`AccessToken`], reporting a
/// standard OAuth2 error payload as [`AuthError::Provider`].
pub fn token_from_map(map: Map<String, Value>) -> Result<AccessToken, AuthError> {
    if !map.contains_key("access_token") {
        if let Some(error) = oauth_error(&map) {
            return Err(AuthError::Provider(error));
        }
    }
    AccessToken::new(map)
}

/// Parse a JSON token response.
pub fn parse_json_token(body: &str) -> Result<AccessToken, AuthError> {
    token_from_map(parse_json_object(body)?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
