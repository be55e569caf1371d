//! QQ Connect provider.
//!
//! QQ deviates from plain OAuth2 in three ways: the token endpoint answers
//! with a query string, the `openid` must be resolved through a separate
//! `oauth2.0/me` call, and several endpoints wrap their JSON in a JSONP
//! `callback( ... );` envelope.

use async_trait::async_trait;
use log::warn;
use serde_json::{Map, Value};
use socialite_core::oauth2::{
    build_url, is_callback, oauth_error, parse_json_object, parse_query_string,
    strip_callback, token_from_map,
};
use socialite_core::user::map_field;
use socialite_core::{
    AccessToken, AuthError, AuthorizationRequest, ClientCredentials, HttpClient, HttpRequest,
    Items, SocialProvider,
};

/// The QQ Connect API host.
pub const DEFAULT_BASE_URL: &str = "https://graph.qq.com";

/// QQ Connect provider.
#[derive(Debug, Clone)]
pub struct QqProvider {
    base_url: String,
}

impl Default for QqProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl QqProvider {
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

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// Parse a token response: `access_token=...&expires_in=...` on success,
/// a JSONP-wrapped error object on failure.
pub fn parse_token(body: &str) -> Result<AccessToken, AuthError> {
    if is_callback(body) {
        let error = parse_json_object(strip_callback(body))?;
        return Err(provider_error(&error));
    }

    let map = parse_query_string(body);
    if !map.contains_key("access_token") && oauth_error(&map).is_none() {
        return Err(AuthError::Parse(
            "QQ token response is not a query string".into(),
        ));
    }
    token_from_map(map)
}

/// Decode a possibly JSONP-wrapped JSON object and reject error payloads
/// (`{"error": ...}` or a non-zero `ret`).
pub fn parse_response(body: &str) -> Result<Map<String, Value>, AuthError> {
    let map = parse_json_object(strip_callback(body))?;
    let failed = map.contains_key("error")
        || map
            .get("ret")
            .and_then(Value::as_i64)
            .is_some_and(|ret| ret != 0);
    if failed {
        return Err(provider_error(&map));
    }
    Ok(map)
}

fn provider_error(map: &Map<String, Value>) -> AuthError {
    let message = oauth_error(map).unwrap_or_else(|| {
        let ret = map.get("ret").map(Value::to_string).unwrap_or_default();
        let msg = map.get("msg").and_then(Value::as_str).unwrap_or_default();
        format!("{ret}: {msg}")
    });
    warn!("QQ returned an error: {message}");
    AuthError::Provider(message)
}

#[async_trait]
impl SocialProvider for QqProvider {
    fn provider_id(&self) -> &str {
        "qq"
    }

    fn default_scopes(&self) -> Vec<String> {
        vec!["get_user_info".into()]
    }

    fn authorize_url(&self, request: &AuthorizationRequest<'_>) -> String {
        build_url(
            &self.url("oauth2.0/authorize"),
            &request.code_fields(self.scope_separator()),
        )
    }

    async fn exchange_code(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessToken, AuthError> {
        let request = HttpRequest::get(self.url("oauth2.0/token"))
            .params(credentials.token_fields(code))
            .param("grant_type", "authorization_code");
        parse_token(&http.send(request).await?)
    }

    async fn fetch_profile(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        token: &AccessToken,
    ) -> Result<Map<String, Value>, AuthError> {
        let me = HttpRequest::get(self.url("oauth2.0/me")).param("access_token", token.token());
        let openid = parse_response(&http.send(me).await?)?
            .get("openid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::Parse("QQ did not return an openid".into()))?;

        let info = HttpRequest::get(self.url("user/get_user_info"))
            .param("access_token", token.token())
            .param("openid", openid.as_str())
            .param("oauth_consumer_key", credentials.client_id.as_str());
        let mut profile = parse_response(&http.send(info).await?)?;
        profile.insert("openid".into(), Value::String(openid));
        Ok(profile)
    }

    fn map_profile(&self, raw: &Items) -> Map<String, Value> {
        let mut user = Map::new();
        user.insert("id".into(), map_field(raw, "openid"));
        user.insert("nickname".into(), map_field(raw, "nickname"));
        user.insert("name".into(), map_field(raw, "nickname"));
        user.insert("email".into(), map_field(raw, "email"));
        user.insert("avatar".into(), map_field(raw, "figureurl_qq_2"));
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_authorize_url() {
        let scopes = QqProvider::new().default_scopes();
        let parameters = BTreeMap::new();
        let url = QqProvider::new().authorize_url(&AuthorizationRequest {
            client_id: "101",
            redirect_uri: Some("https://example.com/qq"),
            scopes: &scopes,
            parameters: &parameters,
            state: Some("abc"),
        });

        assert_eq!(
            url,
            "https://graph.qq.com/oauth2.0/authorize?client_id=101\
             &redirect_uri=https%3A%2F%2Fexample.com%2Fqq&scope=get_user_info\
             &response_type=code&state=abc"
        );
    }

    #[test]
    fn test_parse_query_string_token() {
        let token = parse_token("access_token=ABC&expires_in=7776000").unwrap();
        assert_eq!(token.token(), "ABC");
        assert_eq!(token.get_item("expires_in"), Some(&json!("7776000")));
        assert_eq!(token.expires_in(), Some(7_776_000));
    }

    #[test]
    fn test_parse_token_error() {
        let err = parse_token(
            r#"callback( {"error":100019,"error_description":"code to access token error"} );"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AuthError::Provider("100019: code to access token error".into())
        );
    }

    #[test]
    fn test_parse_token_rejects_non_query_body() {
        let err = parse_token("<html><body>502 Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, AuthError::Parse(_)));

        let err = parse_token("access_token=&expires_in=7776000").unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_response_keeps_callback_in_nickname() {
        let profile = parse_response(
            r#"{"ret":0,"msg":"","nickname":"(callback)","figureurl_qq_2":"http://q/100"}"#,
        )
        .unwrap();
        assert_eq!(profile["nickname"], json!("(callback)"));
        assert_eq!(profile["figureurl_qq_2"], json!("http://q/100"));
    }

    #[test]
    fn test_parse_response_rejects_non_zero_ret() {
        let err = parse_response(r#"{"ret":1002,"msg":"请先登录"}"#).unwrap_err();
        assert_eq!(err, AuthError::Provider("1002: 请先登录".into()));

        let ok = parse_response(r#"{"ret":0,"nickname":"qq"}"#).unwrap();
        assert_eq!(ok["nickname"], json!("qq"));
    }

    #[test]
    fn test_map_profile() {
        let raw = Items::from(match json!({
            "openid": "OPENID",
            "nickname": "小明",
            "figureurl_qq_1": "http://q/40",
            "figureurl_qq_2": "http://q/100"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        });

        let user = QqProvider::new().map_profile(&raw);
        assert_eq!(user["id"], json!("OPENID"));
        assert_eq!(user["nickname"], json!("小明"));
        assert_eq!(user["name"], json!("小明"));
        assert_eq!(user["avatar"], json!("http://q/100"));
        assert_eq!(user["email"], Value::Null);
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let provider = QqProvider::new().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(provider.url("oauth2.0/me"), "http://127.0.0.1:8080/oauth2.0/me");
    }
}
