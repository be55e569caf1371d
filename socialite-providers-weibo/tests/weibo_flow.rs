use socialite_core::{AuthError, ClientCredentials, HttpOptions, ReqwestClient};
use socialite_flow::OAuth2Flow;
use socialite_providers_weibo::WeiboProvider;
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn flow(server: &MockServer) -> OAuth2Flow {
    OAuth2Flow::new(
        WeiboProvider::new().with_base_url(server.uri()),
        ClientCredentials::new("wb1", "wb-secret", Some("https://example.com/weibo".into())),
        Arc::new(ReqwestClient::new(&HttpOptions::default()).unwrap()),
    )
}

#[tokio::test]
async fn test_full_login_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/oauth2/access_token"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("client_id=wb1"))
        .and(body_string_contains("client_secret=wb-secret"))
        .and(body_string_contains("code=CODE"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"access_token":"WB_TOKEN","remind_in":"157679999","expires_in":157679999,"uid":"1404376560"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/show.json"))
        .and(query_param("uid", "1404376560"))
        .and(query_param("access_token", "WB_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":1404376560,"screen_name":"zaku","name":"zaku",
                "avatar_large":"http://tp1.sinaimg.cn/180/1","email":"zaku@example.com"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut adapter = flow(&server);
    let mut session: HashMap<String, String> = HashMap::new();
    let redirect = adapter.redirect(&mut session, None);
    let state = redirect.state().unwrap().to_string();
    assert!(redirect
        .url()
        .starts_with(&format!("{}/oauth2/authorize?client_id=wb1", server.uri())));

    let user = adapter
        .user(&[("code", "CODE"), ("state", state.as_str())], &session)
        .await
        .unwrap();

    assert_eq!(user.id(), Some("1404376560"));
    assert_eq!(user.nickname(), Some("zaku"));
    assert_eq!(user.name(), Some("zaku"));
    assert_eq!(user.email(), Some("zaku@example.com"));
    assert_eq!(user.avatar(), Some("http://tp1.sinaimg.cn/180/1"));
    assert_eq!(user.token(), Some("WB_TOKEN"));
    assert_eq!(user.refresh_token(), None);
    assert_eq!(user.expires_in(), Some(157_679_999));
}

#[tokio::test]
async fn test_stateless_flow_skips_state_check() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/oauth2/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"access_token":"WB_TOKEN","uid":42}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/show.json"))
        .and(query_param("uid", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"id":42,"screen_name":"s"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut adapter = flow(&server);
    adapter.stateless();

    let session: HashMap<String, String> = HashMap::new();
    let user = adapter.user(&[("code", "CODE")], &session).await.unwrap();
    assert_eq!(user.id(), Some("42"));
}

#[tokio::test]
async fn test_http_error_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/oauth2/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error":"invalid_grant","error_code":21325,"request":"/oauth2/access_token"}"#,
        ))
        .mount(&server)
        .await;

    let err = flow(&server).get_access_token("BAD").await.unwrap_err();
    match err {
        AuthError::Transport(message) => assert!(message.contains("invalid_grant")),
        other => panic!("unexpected error: {other:?}"),
    }
}
