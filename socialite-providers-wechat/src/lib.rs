//! WeChat provider.
//!
//! Covers both the open platform website login (`snsapi_login`, served
//! from `qrconnect`) and the official-account OAuth (`snsapi_base` /
//! `snsapi_userinfo`, served from `oauth2/authorize`). WeChat names the
//! client credentials `appid` and `secret`, always expects a `state`, and
//! reports failures as `{"errcode": .., "errmsg": ..}` with a 200 status.

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{Map, Value};
use socialite_core::oauth2::{build_url, generate_state, merge_fields, parse_json_object};
use socialite_core::user::map_field;
use socialite_core::{
    AccessToken, AuthError, AuthorizationRequest, ClientCredentials, HttpClient, HttpRequest,
    Items, SocialProvider,
};

/// Host serving the authorize pages.
pub const DEFAULT_OPEN_BASE_URL: &str = "https://open.weixin.qq.com/connect";
/// Host serving the token and user info APIs.
pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com/sns";

const SCOPE_LOGIN: &str = "snsapi_login";
const SCOPE_BASE: &str = "snsapi_base";

/// WeChat provider.
#[derive(Debug, Clone)]
pub struct WeChatProvider {
    open_base_url: String,
    api_base_url: String,
}

impl Default for WeChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WeChatProvider {
    pub fn new() -> Self {
        Self {
            open_base_url: DEFAULT_OPEN_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Override the host of the authorize pages.
    pub fn with_open_base_url(mut self, url: impl Into<String>) -> Self {
        self.open_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the host of the token and user info APIs.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Decode a JSON response, reporting a non-zero `errcode` as
/// [`AuthError::Provider`].
pub fn parse_response(body: &str) -> Result<Map<String, Value>, AuthError> {
    let map = parse_json_object(body)?;
    match map.get("errcode").and_then(Value::as_i64) {
        Some(code) if code != 0 => {
            let message = map
                .get("errmsg")
                .and_then(Value::as_str)
                .unwrap_or_default();
            warn!("WeChat returned error {code}: {message}");
            Err(AuthError::Provider(format!("{code}: {message}")))
        }
        _ => Ok(map),
    }
}

#[async_trait]
impl SocialProvider for WeChatProvider {
    fn provider_id(&self) -> &str {
        "wechat"
    }

    fn default_scopes(&self) -> Vec<String> {
        vec![SCOPE_LOGIN.into()]
    }

    fn stateless_by_default(&self) -> bool {
        true
    }

    fn authorize_url(&self, request: &AuthorizationRequest<'_>) -> String {
        let path = if request.scopes.iter().any(|s| s == SCOPE_LOGIN) {
            "qrconnect"
        } else {
            "oauth2/authorize"
        };

        let mut fields = vec![
            ("appid".to_string(), request.client_id.to_string()),
            (
                "redirect_uri".to_string(),
                request.redirect_uri.unwrap_or_default().to_string(),
            ),
            ("response_type".to_string(), "code".to_string()),
            ("scope".to_string(), request.scope(self.scope_separator())),
        ];
        merge_fields(
            &mut fields,
            request
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        let state = request
            .state
            .map(str::to_string)
            .unwrap_or_else(generate_state);
        merge_fields(&mut fields, [("state".to_string(), state)]);

        let url = build_url(&format!("{}/{path}", self.open_base_url), &fields);
        format!("{url}#wechat_redirect")
    }

    async fn exchange_code(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessToken, AuthError> {
        let request = HttpRequest::post(format!("{}/oauth2/access_token", self.api_base_url))
            .param("appid", credentials.client_id.as_str())
            .param("secret", credentials.client_secret.as_str())
            .param("code", code)
            .param("grant_type", "authorization_code")
            .accept_json();
        AccessToken::new(parse_response(&http.send(request).await?)?)
    }

    async fn fetch_profile(
        &self,
        http: &dyn HttpClient,
        _credentials: &ClientCredentials,
        token: &AccessToken,
    ) -> Result<Map<String, Value>, AuthError> {
        let scopes = token.get_str("scope").unwrap_or_default();
        if scopes.split(',').any(|s| s.trim() == SCOPE_BASE) {
            debug!("WeChat token has {SCOPE_BASE} scope, using token as profile");
            return Ok(token.to_map());
        }

        let request = HttpRequest::get(format!("{}/userinfo", self.api_base_url))
            .param("access_token", token.token())
            .param("openid", token.get_str("openid").unwrap_or_default())
            .param("lang", "zh_CN");
        parse_response(&http.send(request).await?)
    }

    fn map_profile(&self, raw: &Items) -> Map<String, Value> {
        let mut user = Map::new();
        user.insert("id".into(), map_field(raw, "openid"));
        user.insert("name".into(), map_field(raw, "nickname"));
        user.insert("nickname".into(), map_field(raw, "nickname"));
        user.insert("avatar".into(), map_field(raw, "headimgurl"));
        user.insert("email".into(), Value::Null);
        user
    }
}
