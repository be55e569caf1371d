//! Sina Weibo provider.

use async_trait::async_trait;
use log::warn;
use serde_json::{Map, Value};
use socialite_core::items::scalar_to_string;
use socialite_core::oauth2::{build_url, oauth_error, parse_json_object, token_from_map};
use socialite_core::user::map_field;
use socialite_core::{
    AccessToken, AuthError, AuthorizationRequest, ClientCredentials, HttpClient, HttpRequest,
    Items, SocialProvider,
};

/// The Weibo API host.
pub const DEFAULT_BASE_URL: &str = "https://api.weibo.com";
/// The API version segment of the token and profile endpoints.
pub const API_VERSION: &str = "2";

/// Sina Weibo provider.
#[derive(Debug, Clone)]
pub struct WeiboProvider {
    base_url: String,
}

impl Default for WeiboProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WeiboProvider {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at another host (a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{API_VERSION}/{path}", self.base_url)
    }
}

/// Decode a JSON response, reporting `{"error": .., "error_code": ..}` as
/// [`AuthError::Provider`].
pub fn parse_response(body: &str) -> Result<Map<String, Value>, AuthError> {
    let map = parse_json_object(body)?;
    match oauth_error(&map) {
        Some(error) => {
            let message = match map.get("error_code") {
                Some(code) => format!("{}: {error}", code),
                None => error,
            };
            warn!("Weibo returned an error: {message}");
            Err(AuthError::Provider(message))
        }
        None => Ok(map),
    }
}

#[async_trait]
impl SocialProvider for WeiboProvider {
    fn provider_id(&self) -> &str {
        "weibo"
    }

    fn default_scopes(&self) -> Vec<String> {
        vec!["email".into()]
    }

    fn authorize_url(&self, request: &AuthorizationRequest<'_>) -> String {
        build_url(
            &format!("{}/oauth2/authorize", self.base_url),
            &request.code_fields(self.scope_separator()),
        )
    }

    async fn exchange_code(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessToken, AuthError> {
        let request = HttpRequest::post(self.api_url("oauth2/access_token"))
            .params(credentials.token_fields(code))
            .param("grant_type", "authorization_code")
            .accept_json();
        token_from_map(parse_response(&http.send(request).await?)?)
    }

    async fn fetch_profile(
        &self,
        http: &dyn HttpClient,
        _credentials: &ClientCredentials,
        token: &AccessToken,
    ) -> Result<Map<String, Value>, AuthError> {
        let uid = token
            .get_item("uid")
            .and_then(scalar_to_string)
            .ok_or_else(|| {
                AuthError::InvalidArgument("The Weibo access token has no \"uid\".".into())
            })?;

        let request = HttpRequest::get(self.api_url("users/show.json"))
            .param("uid", uid)
            .param("access_token", token.token())
            .accept_json();
        parse_response(&http.send(request).await?)
    }

    fn map_profile(&self, raw: &Items) -> Map<String, Value> {
        let mut user = Map::new();
        user.insert("id".into(), map_field(raw, "id"));
        user.insert("nickname".into(), map_field(raw, "screen_name"));
        user.insert("name".into(), map_field(raw, "name"));
        user.insert("email".into(), map_field(raw, "email"));
        user.insert("avatar".into(), map_field(raw, "avatar_large"));
        user
    }
}
