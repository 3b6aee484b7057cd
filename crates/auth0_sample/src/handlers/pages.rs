use askama::Template;
use auth0_sample_auth::{OptionalSession, PROVIDER_NAME};
use auth0_sample_core::auth::is_authorized;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Template wrapper that converts Askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {err}"),
            )
                .into_response(),
        }
    }
}

/// Index page template showing the signed-in profile or a login link.
#[derive(Template, Default)]
#[template(path = "index.html")]
struct IndexTemplate {
    authenticated: bool,
    display_name: String,
    user_name: String,
    email: String,
    roles: Vec<String>,
    extra_data: Vec<(String, String)>,
}

/// Handler for the index page (GET /).
pub async fn index(OptionalSession(session): OptionalSession) -> impl IntoResponse {
    let template = match session {
        Some(session) if is_authorized(&session, PROVIDER_NAME) => IndexTemplate {
            authenticated: true,
            display_name: session
                .display_name
                .clone()
                .or_else(|| session.user_name.clone())
                .unwrap_or_else(|| "there".to_string()),
            user_name: session.user_name.clone().unwrap_or_default(),
            email: session.email.clone().unwrap_or_default(),
            roles: session.roles,
            extra_data: session.extra_data.into_iter().collect(),
        },
        _ => IndexTemplate::default(),
    };

    HtmlTemplate(template)
}
