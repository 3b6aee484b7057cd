//! Mock IdP server for development and testing.
//!
//! This server simulates the Auth0 endpoints the provider talks to. The
//! authorization code and the access token both carry the submitted profile,
//! base64url-encoded, so the server needs no state.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use url::Url;

use super::templates;

#[derive(Deserialize)]
struct AuthorizeQuery {
    redirect_uri: String,
    #[serde(default)]
    connection: String,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    name: Option<String>,
    groups: Option<String>,
    connection: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenForm {
    code: String,
    grant_type: String,
}

#[derive(Deserialize)]
struct UserInfoQuery {
    access_token: String,
}

/// Mock IdP server that simulates the Auth0 endpoints.
pub struct MockIdpServer {
    port: u16,
}

impl MockIdpServer {
    /// Create a new Mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Run the Mock IdP server.
    ///
    /// This starts an HTTP server that handles:
    /// - `GET /authorize` - Login page
    /// - `POST /authorize/submit` - Form submission handler
    /// - `POST /oauth/token` - Code exchange
    /// - `GET /userinfo` - User profile
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, mock_idp_router()).await
    }
}

/// Router with the mock Auth0 endpoints.
pub fn mock_idp_router() -> Router {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/authorize/submit", post(authorize_submit))
        .route("/oauth/token", post(token))
        .route("/userinfo", get(userinfo))
}

async fn authorize(Query(params): Query<AuthorizeQuery>) -> Html<String> {
    Html(templates::login_page(&params.connection, &params.redirect_uri))
}

async fn authorize_submit(Form(form): Form<LoginForm>) -> Response {
    let Ok(mut callback_url) = Url::parse(&form.redirect_uri) else {
        return (StatusCode::BAD_REQUEST, "invalid redirect_uri").into_response();
    };

    let nickname = form
        .email
        .split('@')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("user")
        .to_string();
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| nickname.clone());
    let mut parts = name.splitn(2, ' ');
    let given_name = parts.next().unwrap_or_default().to_string();
    let family_name = parts.next().unwrap_or_default().to_string();
    let groups: Vec<String> = form
        .groups
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(String::from)
        .collect();
    let connection = if form.connection.is_empty() {
        "Username-Password-Authentication".to_string()
    } else {
        form.connection
    };

    let profile = json!({
        "user_id": format!("{}|{}", connection, form.email),
        "nickname": nickname,
        "name": name,
        "given_name": given_name,
        "family_name": family_name,
        "email": form.email,
        "email_verified": true,
        "groups": groups,
        "identities": [{"provider": connection, "user_id": form.email, "isSocial": false}],
    });

    // Mock authorization code that encodes the user info
    let code = URL_SAFE_NO_PAD.encode(profile.to_string());
    callback_url.query_pairs_mut().append_pair("code", &code);

    Redirect::to(callback_url.as_str()).into_response()
}

async fn token(Form(form): Form<TokenForm>) -> Response {
    if form.grant_type != "authorization_code" || decode_profile(&form.code).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid authorization code"})),
        )
            .into_response();
    }

    Json(json!({
        "access_token": form.code,
        "token_type": "bearer",
        "expires_in": 86400,
    }))
    .into_response()
}

async fn userinfo(Query(params): Query<UserInfoQuery>) -> Response {
    match decode_profile(&params.access_token) {
        Some(profile) => Json(profile).into_response(),
        None => (StatusCode::UNAUTHORIZED, "invalid access token").into_response(),
    }
}

fn decode_profile(encoded: &str) -> Option<Value> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    serde_json::from_slice::<Value>(&bytes)
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login(email: &str) -> String {
        let response = mock_idp_router()
            .oneshot(form_post(
                "/authorize/submit",
                &format!(
                    "email={email}&name=Dev+User&groups=admins%2C+editors\
                     &connection=&redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fauth0"
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers()["location"].to_str().unwrap();
        let url = Url::parse(location).unwrap();
        assert_eq!(url.path(), "/auth/auth0");
        url.query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn authorize_renders_login_page() {
        let response = mock_idp_router()
            .oneshot(
                Request::builder()
                    .uri("/authorize?client_id=c&redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fauth0&response_type=code&connection=github")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"value="github""#));
    }

    #[tokio::test]
    async fn code_exchanges_for_profile() {
        let code = login("dev@example.com").await;

        let response = mock_idp_router()
            .oneshot(form_post(
                "/oauth/token",
                &format!("client_id=c&client_secret=s&code={code}&grant_type=authorization_code"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await;
        let access_token = token["access_token"].as_str().unwrap().to_string();

        let response = mock_idp_router()
            .oneshot(
                Request::builder()
                    .uri(format!("/userinfo?access_token={access_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let profile = body_json(response).await;
        assert_eq!(profile["nickname"], "dev");
        assert_eq!(profile["given_name"], "Dev");
        assert_eq!(profile["family_name"], "User");
        assert_eq!(profile["groups"], json!(["admins", "editors"]));
        assert_eq!(
            profile["user_id"],
            "Username-Password-Authentication|dev@example.com"
        );
    }

    #[tokio::test]
    async fn malformed_code_is_rejected_with_400() {
        let response = mock_idp_router()
            .oneshot(form_post(
                "/oauth/token",
                "client_id=c&client_secret=s&code=not-a-code&grant_type=authorization_code",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_access_token_is_unauthorized() {
        let response = mock_idp_router()
            .oneshot(
                Request::builder()
                    .uri("/userinfo?access_token=nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
