use std::time::Duration;

use auth0_sample_auth::auth_routes;
use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{handlers::pages::index, state::AppState};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Auth routes (/auth, /auth/auth0, /auth/logout)
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use auth0_sample_auth::{AuthConfig, AuthState, SessionStore};
    use axum::{
        body::Body,
        http::{header, Request, Response},
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(realm: &str) -> AppState {
        let realm = realm.to_string();
        let config = AuthConfig::from_lookup(move |key| match key {
            "AUTH0_APP_ID" => Some("client".to_string()),
            "AUTH0_APP_SECRET" => Some("secret".to_string()),
            "AUTH0_REALM" => Some(realm.clone()),
            "COOKIE_SECURE" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(AuthState::new(Arc::new(SessionStore::new()), config).unwrap())
    }

    async fn body_text(response: Response<Body>) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_page_anonymous() {
        let server = MockServer::start().await;
        let app = create_app(test_state(&server.uri()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Log in with Auth0"));
        assert!(!html.contains("Log out"));
    }

    #[tokio::test]
    async fn test_index_page_after_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-1",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "auth0|1",
                "nickname": "jdoe",
                "name": "John Doe",
                "email": "john@example.com",
                "groups": ["admins"],
                "locale": "en"
            })))
            .mount(&server)
            .await;
        let app = create_app(test_state(&server.uri()));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/auth0?code=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("ss-id="))
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Hello, John Doe"));
        assert!(html.contains("<li>admins</li>"));
        assert!(html.contains("<td>locale</td><td>en</td>"));
        assert!(html.contains("Log out"));
    }

    #[tokio::test]
    async fn test_auth_routes_are_mounted() {
        let server = MockServer::start().await;
        let app = create_app(test_state(&server.uri()));

        let response = app
            .oneshot(Request::builder().uri("/auth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
