//! HTML for the mock Auth0 login page.

/// Connections offered when the authorize request names none.
const KNOWN_CONNECTIONS: [&str; 3] = ["Username-Password-Authentication", "google-oauth2", "github"];

/// Escape HTML special characters to prevent XSS.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `<option>` list for the connection picker, with `selected` preselected.
fn connection_options(selected: &str) -> String {
    let mut connections: Vec<&str> = KNOWN_CONNECTIONS.to_vec();
    if !selected.is_empty() && !connections.contains(&selected) {
        connections.insert(0, selected);
    }

    connections
        .into_iter()
        .map(|c| {
            let marker = if c == selected { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{marker}>{value}</option>"#,
                value = html_escape(c)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

/// Login form posting to `/authorize/submit`.
///
/// `redirect_uri` is carried through a hidden field so the submit handler
/// can send the browser back to the app with a code.
pub fn login_page(connection: &str, redirect_uri: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <title>Mock Auth0 (development)</title>
    <style>
        body {{ font-family: system-ui, sans-serif; background: #f4f5f7; }}
        main {{ max-width: 380px; margin: 80px auto; background: white; padding: 24px 28px; border-radius: 6px; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.15); }}
        .notice {{ font-size: 13px; color: #8a6d3b; border-left: 3px solid #f0ad4e; padding-left: 10px; }}
        label {{ display: block; margin: 14px 0 4px; font-size: 14px; }}
        input, select {{ width: 100%; padding: 8px; box-sizing: border-box; }}
        button {{ margin-top: 20px; width: 100%; padding: 10px; background: #eb5424; color: white; border: 0; border-radius: 4px; }}
    </style>
</head>
<body>
<main>
    <h1>Mock Auth0</h1>
    <p class="notice">Development tenant. Any email is accepted and no password is checked.</p>

    <form action="/authorize/submit" method="POST">
        <input type="hidden" name="redirect_uri" value="{redirect_uri}" />

        <label for="connection">Connection</label>
        <select id="connection" name="connection">
            {options}
        </select>

        <label for="email">Email</label>
        <input type="email" id="email" name="email" placeholder="dev@example.com" required />

        <label for="name">Full name</label>
        <input type="text" id="name" name="name" placeholder="Dev User" />

        <label for="groups">Groups (comma separated)</label>
        <input type="text" id="groups" name="groups" placeholder="admins, editors" />

        <button type="submit">Continue</button>
    </form>
</main>
</body>
</html>"#,
        options = connection_options(connection),
        redirect_uri = html_escape(redirect_uri),
    )
}
