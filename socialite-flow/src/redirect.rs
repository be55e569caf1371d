use http::{header, HeaderValue, Response, StatusCode};
use socialite_core::AuthError;

/// Where to send the browser to start the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    url: String,
    state: Option<String>,
}

impl Redirect {
    pub(crate) fn new(url: String, state: Option<String>) -> Self {
        Self { url, state }
    }

    /// The provider's authorize URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The anti-forgery state stored in the session, if any.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// A `302 Found` response pointing at the authorize URL.
    pub fn into_response(self) -> Result<Response<()>, AuthError> {
        let location = HeaderValue::try_from(self.url)
            .map_err(|e| AuthError::InvalidArgument(format!("Invalid redirect URL: {e}")))?;

        let mut response = Response::new(());
        *response.status_mut() = StatusCode::FOUND;
        response.headers_mut().insert(header::LOCATION, location);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_sets_location() {
        let redirect = Redirect::new(
            "https://open.weixin.qq.com/connect/qrconnect?appid=a#wechat_redirect".into(),
            None,
        );
        let response = redirect.into_response().unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://open.weixin.qq.com/connect/qrconnect?appid=a#wechat_redirect"
        );
    }

    #[test]
    fn test_invalid_location_is_rejected() {
        let redirect = Redirect::new("https://example.com/\n".into(), Some("s".into()));
        assert_eq!(redirect.state(), Some("s"));
        assert!(redirect.into_response().is_err());
    }
}
