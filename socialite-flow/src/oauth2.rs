use crate::Redirect;
use log::{debug, warn};
use socialite_core::session::STATE_KEY;
use socialite_core::{
    oauth2::generate_state, AccessToken, AuthError, AuthorizationRequest, CallbackRequest,
    ClientCredentials, HttpClient, Items, SessionStore, SocialProvider, User,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Orchestrates the OAuth2 Authorization Code flow for one provider.
///
/// The provider supplies the dialect (URLs, field names, response formats);
/// the flow owns the credentials and the per-adapter settings (scopes, extra
/// authorize parameters, state mode) and runs
/// redirect → callback → exchange → fetch → map.
pub struct OAuth2Flow {
    provider: Box<dyn SocialProvider>,
    http: Arc<dyn HttpClient>,
    credentials: ClientCredentials,
    scopes: Vec<String>,
    parameters: BTreeMap<String, String>,
    stateless: bool,
}

impl OAuth2Flow {
    /// Create a new `OAuth2Flow` for `provider`, starting from its default
    /// scopes and state mode.
    pub fn new<P>(provider: P, credentials: ClientCredentials, http: Arc<dyn HttpClient>) -> Self
    where
        P: SocialProvider + 'static,
    {
        Self::from_boxed(Box::new(provider), credentials, http)
    }

    /// Create a new `OAuth2Flow` from an already boxed provider.
    pub fn from_boxed(
        provider: Box<dyn SocialProvider>,
        credentials: ClientCredentials,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            scopes: provider.default_scopes(),
            stateless: provider.stateless_by_default(),
            provider,
            http,
            credentials,
            parameters: BTreeMap::new(),
        }
    }

    /// Get the provider identifier.
    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    /// The configured credentials.
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Set the scopes of the requested access.
    pub fn scopes<I, S>(&mut self, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// The scopes currently requested.
    pub fn requested_scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Replace the extra parameters sent with the authorize request.
    pub fn with<I, K, V>(&mut self, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Skip the session `state` check.
    pub fn stateless(&mut self) -> &mut Self {
        self.stateless = true;
        self
    }

    /// Require the session `state` check.
    pub fn with_state(&mut self) -> &mut Self {
        self.stateless = false;
        self
    }

    /// Whether the flow mints and verifies an anti-forgery state.
    pub fn uses_state(&self) -> bool {
        !self.stateless
    }

    /// Set the callback URL.
    pub fn set_redirect_url(&mut self, redirect_url: impl Into<String>) -> &mut Self {
        self.credentials.redirect_url = Some(redirect_url.into());
        self
    }

    /// The callback URL.
    pub fn redirect_url(&self) -> Option<&str> {
        self.credentials.redirect_url.as_deref()
    }

    /// Build the authorize URL for the given state.
    pub fn authorize_url(&self, state: Option<&str>) -> String {
        let request = AuthorizationRequest {
            client_id: &self.credentials.client_id,
            redirect_uri: self.credentials.redirect_url.as_deref(),
            scopes: &self.scopes,
            parameters: &self.parameters,
            state: state.filter(|_| self.uses_state()),
        };
        self.provider.authorize_url(&request)
    }

    /// Start the flow: mint a state (unless stateless), store it in the
    /// session and return the redirect to the provider's authorize page.
    ///
    /// `redirect_url` overrides the configured callback URL.
    pub fn redirect(
        &mut self,
        session: &mut dyn SessionStore,
        redirect_url: Option<&str>,
    ) -> Redirect {
        if let Some(url) = redirect_url {
            self.set_redirect_url(url);
        }

        let state = self.uses_state().then(generate_state);
        if let Some(state) = &state {
            session.set(STATE_KEY, state.clone());
        }

        let url = self.authorize_url(state.as_deref());
        debug!("Redirecting to {} authorization page", self.provider_id());
        Redirect::new(url, state)
    }

    /// Complete the flow from the provider's callback.
    ///
    /// Verifies the `state` (unless stateless) before any network call,
    /// exchanges the `code` for a token and fetches the user.
    pub async fn user(
        &self,
        request: &dyn CallbackRequest,
        session: &dyn SessionStore,
    ) -> Result<User, AuthError> {
        if self.has_invalid_state(request, session) {
            warn!("{} callback state mismatch", self.provider_id());
            return Err(AuthError::InvalidState);
        }

        let code = request
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                AuthError::InvalidArgument("The callback request has no \"code\".".into())
            })?;

        let token = self.get_access_token(&code).await?;
        self.user_from_token(token).await
    }

    /// Fetch the user for a token obtained out-of-band. No state check and no
    /// code exchange happen.
    pub async fn user_from_token(&self, token: AccessToken) -> Result<User, AuthError> {
        let raw = self
            .provider
            .fetch_profile(self.http.as_ref(), &self.credentials, &token)
            .await?;
        debug!("Fetched {} user profile", self.provider_id());

        let attributes = self.provider.map_profile(&Items::from(raw.clone()));
        let mut user = User::new(attributes).with_raw(raw);
        user.set_token(token.token())
            .set_refresh_token(token.refresh_token())
            .set_expires_in(token.expires_in());
        Ok(user)
    }

    /// Exchange an authorization code for an access token.
    pub async fn get_access_token(&self, code: &str) -> Result<AccessToken, AuthError> {
        let token = self
            .provider
            .exchange_code(self.http.as_ref(), &self.credentials, code)
            .await?;
        debug!("Exchanged {} authorization code", self.provider_id());
        Ok(token)
    }

    /// Refresh an access token. None of the built-in providers support it.
    pub async fn refresh_access_token(&self, token: &AccessToken) -> Result<AccessToken, AuthError> {
        self.provider
            .refresh_token(self.http.as_ref(), &self.credentials, token)
            .await
    }

    fn has_invalid_state(&self, request: &dyn CallbackRequest, session: &dyn SessionStore) -> bool {
        if !self.uses_state() {
            return false;
        }

        match (session.get(STATE_KEY), request.get(STATE_KEY)) {
            (Some(expected), Some(received)) => expected.is_empty() || expected != received,
            _ => true,
        }
    }
}
