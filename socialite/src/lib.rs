//! # Socialite
//!
//! OAuth2 social login for QQ, WeChat and Weibo.
//!
//! This crate re-exports [`socialite_core`] and [`socialite_flow`] and
//! registers the providers enabled through cargo features (`qq`, `wechat`,
//! `weibo`, all on by default) into a [`Socialite`] registry.
//!
//! ```no_run
//! # async fn run() -> Result<(), socialite::AuthError> {
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! let config = socialite::Config::try_from(json!({
//!     "weibo": {
//!         "client_id": "app-key",
//!         "client_secret": "app-secret",
//!         "redirect": "https://example.com/auth/weibo/callback"
//!     }
//! }))?;
//! let mut socialite = socialite::registry(config);
//!
//! let mut session: HashMap<String, String> = HashMap::new();
//! let redirect = socialite.adapter("weibo")?.redirect(&mut session, None);
//! // send the browser to `redirect.url()`, then on the callback:
//! let callback: HashMap<String, String> = HashMap::new();
//! let user = socialite.adapter("weibo")?.user(&callback, &session).await?;
//! println!("{:?}", user.nickname());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub use socialite_core::{
    AccessToken, AuthError, CallbackRequest, ClientCredentials, Config, HttpClient, HttpOptions,
    HttpRequest, Items, ProviderConfig, ReqwestClient, SessionStore, SocialProvider, User,
};
pub use socialite_flow::{OAuth2Flow, Redirect, Socialite};

pub use socialite_core::{oauth2, session};

/// QQ Connect provider.
#[cfg(feature = "qq")]
pub use socialite_providers_qq as qq;
/// WeChat provider.
#[cfg(feature = "wechat")]
pub use socialite_providers_wechat as wechat;
/// Sina Weibo provider.
#[cfg(feature = "weibo")]
pub use socialite_providers_weibo as weibo;

/// A registry over `config` with every enabled built-in driver registered.
pub fn registry(config: Config) -> Socialite {
    with_builtin_drivers(Socialite::new(config))
}

/// Register the enabled built-in drivers (`qq`, `wechat`, `weibo`).
#[allow(unused_mut)]
pub fn with_builtin_drivers(mut socialite: Socialite) -> Socialite {
    #[cfg(feature = "qq")]
    {
        socialite = socialite.extend("qq", qq::QqProvider::new);
    }
    #[cfg(feature = "wechat")]
    {
        socialite = socialite.extend("wechat", wechat::WeChatProvider::new);
    }
    #[cfg(feature = "weibo")]
    {
        socialite = socialite.extend("weibo", weibo::WeiboProvider::new);
    }
    socialite
}
