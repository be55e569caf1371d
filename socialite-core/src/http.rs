use crate::config::HttpOptions;
use crate::error::AuthError;
use async_trait::async_trait;
use log::{debug, warn};
pub use ::http::Method;
use url::Url;

const BODY_PREVIEW_LIMIT: usize = 256;

/// An outbound request to a provider endpoint.
///
/// For `GET` the params are encoded into the query string, for `POST` they are
/// sent as a form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: Method,
    /// Target URL, possibly already carrying a query string.
    pub url: String,
    /// Query or form parameters, in order.
    pub params: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request with the given method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Create a `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a `POST` request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Append several parameters.
    pub fn params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.params.extend(params);
        self
    }

    /// Append one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Ask for a JSON response.
    pub fn accept_json(self) -> Self {
        self.header("Accept", "application/json")
    }

    /// The first value of parameter `key`.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The HTTP transport used to talk to providers. Returns the response body.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send `request` and return the response body.
    async fn send(&self, request: HttpRequest) -> Result<String, AuthError>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client honoring the timeout and TLS settings in `options`.
    pub fn new(options: &HttpOptions) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout())
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<String, AuthError> {
        let mut builder = match request.method.as_str() {
            "GET" => {
                let url = if request.params.is_empty() {
                    Url::parse(&request.url)
                } else {
                    Url::parse_with_params(&request.url, &request.params)
                }
                .map_err(|e| AuthError::Transport(format!("Invalid URL {}: {e}", request.url)))?;
                self.client.get(url)
            }
            "POST" => self.client.post(&request.url).form(&request.params),
            other => {
                return Err(AuthError::Transport(format!(
                    "Unsupported HTTP method: {other}"
                )))
            }
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!("{} {}", request.method, request.url);
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("{} {} returned {status}", request.method, request.url);
            return Err(AuthError::Transport(format!(
                "{} {} returned {status}: {}",
                request.method,
                request.url,
                preview(&body)
            )));
        }

        Ok(body)
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_LIMIT {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ReqwestClient {
        ReqwestClient::new(&HttpOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_encodes_params_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/show.json"))
            .and(query_param("uid", "42"))
            .and(query_param("lang", "zh_CN"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .send(
                HttpRequest::get(format!("{}/users/show.json", server.uri()))
                    .param("uid", "42")
                    .param("lang", "zh_CN"),
            )
            .await
            .unwrap();

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_post_sends_form_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%2Fcb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .send(
                HttpRequest::post(format!("{}/token", server.uri()))
                    .param("code", "abc")
                    .param("redirect_uri", "http://localhost/cb")
                    .accept_json(),
            )
            .await
            .unwrap();

        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client()
            .send(HttpRequest::get(server.uri()))
            .await
            .unwrap_err();

        match err {
            AuthError::Transport(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let err = client()
            .send(HttpRequest::new(Method::DELETE, "http://localhost/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
        let short = preview(&long);
        assert_eq!(short.chars().count(), BODY_PREVIEW_LIMIT + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("small"), "small");
    }
}
