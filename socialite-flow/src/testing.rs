use async_trait::async_trait;
use serde_json::{Map, Value};
use socialite_core::oauth2::{build_url, parse_json_object, parse_json_token};
use socialite_core::user::map_field;
use socialite_core::{
    AccessToken, AuthError, AuthorizationRequest, ClientCredentials, HttpClient, HttpRequest,
    Items, SocialProvider,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A standard OAuth2 dialect on a fake host.
pub struct FakeProvider;

#[async_trait]
impl SocialProvider for FakeProvider {
    fn provider_id(&self) -> &str {
        "fake"
    }

    fn default_scopes(&self) -> Vec<String> {
        vec!["basic".into()]
    }

    fn authorize_url(&self, request: &AuthorizationRequest<'_>) -> String {
        build_url(
            "https://fake.example/authorize",
            &request.code_fields(self.scope_separator()),
        )
    }

    async fn exchange_code(
        &self,
        http: &dyn HttpClient,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<AccessToken, AuthError> {
        let body = http
            .send(HttpRequest::post("https://fake.example/token").params(credentials.token_fields(code)))
            .await?;
        parse_json_token(&body)
    }

    async fn fetch_profile(
        &self,
        http: &dyn HttpClient,
        _credentials: &ClientCredentials,
        token: &AccessToken,
    ) -> Result<Map<String, Value>, AuthError> {
        let body = http
            .send(HttpRequest::get("https://fake.example/me").param("access_token", token.token()))
            .await?;
        parse_json_object(&body)
    }

    fn map_profile(&self, raw: &Items) -> Map<String, Value> {
        let mut user = Map::new();
        user.insert("id".into(), map_field(raw, "uid"));
        user.insert("nickname".into(), map_field(raw, "screen_name"));
        user.insert("avatar".into(), map_field(raw, "avatar"));
        user.insert("email".into(), Value::Null);
        user
    }
}

/// Replays canned responses and records every request.
pub struct RecordingClient {
    responses: Mutex<VecDeque<Result<String, AuthError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingClient {
    pub fn new(responses: Vec<Result<String, AuthError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn send(&self, request: HttpRequest) -> Result<String, AuthError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Transport("no canned response".into())))
    }
}
