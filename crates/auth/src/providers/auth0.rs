//! Auth0 provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use auth0_sample_core::auth::{
    json_value_to_string, AuthError, OAuthProviderClient, Result, TokenGrant,
};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

use crate::config::Auth0Config;

/// Name the session's token record is filed under.
pub const PROVIDER_NAME: &str = "auth0";

/// Auth0 provider talking to the tenant's `/authorize`, `/oauth/token` and
/// `/userinfo` endpoints.
pub struct Auth0Provider {
    app_id: String,
    app_secret: String,
    callback_url: Url,
    pre_auth_url: Url,
    access_token_url: Url,
    user_info_url: Url,
    http_client: reqwest::Client,
}

impl Auth0Provider {
    /// Create a provider for the tenant in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client ID, client secret or realm is blank
    /// - The realm does not form valid endpoint URLs
    /// - The HTTP client cannot be built
    pub fn new(config: &Auth0Config, callback_url: &Url) -> std::result::Result<Self, crate::AuthError> {
        config.validate()?;

        let realm = config.realm.trim_end_matches('/');
        let endpoint = |path: &str| {
            Url::parse(&format!("{realm}{path}")).map_err(|e| {
                crate::AuthError::Config(format!("invalid Auth0 endpoint {realm}{path}: {e}"))
            })
        };

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| crate::AuthError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            callback_url: callback_url.clone(),
            pre_auth_url: endpoint("/authorize")?,
            access_token_url: endpoint("/oauth/token")?,
            user_info_url: endpoint("/userinfo")?,
            http_client,
        })
    }
}

#[async_trait]
impl OAuthProviderClient for Auth0Provider {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn authorization_url(&self, connection: &str) -> Result<Url> {
        let mut url = self.pre_auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", self.callback_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("connection", connection);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let response = self
            .http_client
            .post(self.access_token_url.clone())
            .form(&[
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.callback_url.as_str()),
                ("type", "web_server"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST => return Err(AuthError::AccessTokenRejected),
            status => {
                return Err(AuthError::CodeExchange(format!(
                    "token endpoint returned {status}"
                )))
            }
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;
        let Value::Object(fields) = body else {
            return Err(AuthError::CodeExchange(
                "token response is not a JSON object".to_string(),
            ));
        };

        let access_token = fields.get("access_token").and_then(json_value_to_string);
        let items = fields
            .iter()
            .filter(|(key, value)| {
                key.as_str() != "access_token" && !value.is_object() && !value.is_array()
            })
            .filter_map(|(key, value)| json_value_to_string(value).map(|v| (key.clone(), v)))
            .collect();

        Ok(TokenGrant {
            access_token,
            items,
        })
    }

    async fn user_info(&self, access_token: &str) -> Result<Map<String, Value>> {
        let response = self
            .http_client
            .get(self.user_info_url.clone())
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AuthError::UserInfo(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(AuthError::UserInfo(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        match response
            .json::<Value>()
            .await
            .map_err(|e| AuthError::UserInfo(e.to_string()))?
        {
            Value::Object(profile) => Ok(profile),
            _ => Err(AuthError::UserInfo(
                "userinfo response is not a JSON object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(realm: &str) -> Auth0Config {
        Auth0Config {
            app_id: "test-client".to_string(),
            app_secret: "test-secret".to_string(),
            realm: realm.to_string(),
            default_connection: None,
        }
    }

    fn callback() -> Url {
        Url::parse("http://localhost:3000/auth/auth0").unwrap()
    }

    fn provider(realm: &str) -> Auth0Provider {
        Auth0Provider::new(&config(realm), &callback()).unwrap()
    }

    #[test]
    fn new_rejects_missing_secret() {
        let mut cfg = config("https://tenant.auth0.com");
        cfg.app_secret = " ".to_string();
        let result = Auth0Provider::new(&cfg, &callback());
        assert!(matches!(result, Err(crate::AuthError::Config(_))));
    }

    #[test]
    fn endpoints_are_built_from_realm() {
        let p = provider("https://tenant.auth0.com/");
        assert_eq!(p.pre_auth_url.as_str(), "https://tenant.auth0.com/authorize");
        assert_eq!(p.access_token_url.as_str(), "https://tenant.auth0.com/oauth/token");
        assert_eq!(p.user_info_url.as_str(), "https://tenant.auth0.com/userinfo");
    }

    #[test]
    fn authorization_url_carries_client_and_connection() {
        let url = provider("https://tenant.auth0.com")
            .authorization_url("google-oauth2")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://tenant.auth0.com/authorize?client_id=test-client\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fauth0\
             &response_type=code&connection=google-oauth2"
        );
    }

    #[test]
    fn authorization_url_with_empty_connection() {
        let url = provider("https://tenant.auth0.com")
            .authorization_url("")
            .unwrap();
        assert!(url.as_str().ends_with("&response_type=code&connection="));
    }

    #[tokio::test]
    async fn exchange_code_posts_form_and_reads_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("client_secret=test-secret"))
            .and(body_string_contains("code=abc123"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains(
                "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fauth0",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-1",
                "id_token": "eyJ...",
                "token_type": "bearer",
                "expires_in": 86400,
                "scope": {"ignored": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = provider(&server.uri()).exchange_code("abc123").await.unwrap();

        assert_eq!(grant.access_token.as_deref(), Some("at-1"));
        assert_eq!(grant.items.get("token_type").map(String::as_str), Some("bearer"));
        assert_eq!(grant.items.get("expires_in").map(String::as_str), Some("86400"));
        assert!(!grant.items.contains_key("access_token"));
        assert!(!grant.items.contains_key("scope"));
    }

    #[tokio::test]
    async fn exchange_code_maps_400_to_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let result = provider(&server.uri()).exchange_code("bad").await;
        assert!(matches!(result, Err(AuthError::AccessTokenRejected)));
    }

    #[tokio::test]
    async fn exchange_code_maps_other_status_to_exchange_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).exchange_code("abc").await;
        assert!(matches!(result, Err(AuthError::CodeExchange(_))));
    }

    #[tokio::test]
    async fn exchange_code_rejects_non_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("access_token=nope"))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).exchange_code("abc").await;
        assert!(matches!(result, Err(AuthError::CodeExchange(_))));
    }

    #[tokio::test]
    async fn user_info_sends_access_token_as_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(query_param("access_token", "at-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "auth0|1",
                "nickname": "jdoe"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = provider(&server.uri()).user_info("at-1").await.unwrap();
        assert_eq!(profile.get("nickname"), Some(&json!("jdoe")));
    }

    #[tokio::test]
    async fn user_info_fails_on_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).user_info("expired").await;
        assert!(matches!(result, Err(AuthError::UserInfo(_))));
    }
}
