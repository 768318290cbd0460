//! Home page markup.
//!
//! Anonymous visitors get a sign-in link. Signed-in users see the session's `user` entry
//! as pretty-printed JSON inside a `<pre>` block, HTML-escaped, plus a sign-out link.

use domain::user::UserToken;

const TITLE: &str = "Profile Login";

pub(crate) fn render(user: Option<&UserToken>) -> Result<String, serde_json::Error> {
    let body = match user {
        Some(user) => {
            let json = serde_json::to_string_pretty(user)?;
            format!(
                "<p>You are signed in. Session contents:</p>\n  \
                 <pre id=\"session\">{}</pre>\n  \
                 <a href=\"/logout\">Sign out</a>",
                escape(&json)
            )
        }
        None => "<p>You are not signed in.</p>\n  \
                 <a href=\"/google-login\">Sign in with Google</a>"
            .to_string(),
    };

    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
         <title>{TITLE}</title>\n</head>\n<body>\n  <h1>{TITLE}</h1>\n  {body}\n</body>\n</html>\n"
    ))
}

// Element content only needs these three; quotes are left readable.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::TokenSet;
    use serde_json::json;

    fn user_with_profile(person_data: serde_json::Value) -> UserToken {
        UserToken::new(
            TokenSet {
                access_token: "ya29.token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: Some(3599),
                expires_at: None,
                refresh_token: None,
                scope: None,
                id_token: None,
                userinfo: None,
            },
            person_data,
        )
    }

    #[test]
    fn test_anonymous_page_links_to_login() {
        let page = render(None).unwrap();

        assert!(page.contains("href=\"/google-login\""));
        assert!(!page.contains("<pre"));
    }

    #[test]
    fn test_signed_in_page_shows_session_json() {
        let user = user_with_profile(json!({"genders": [{"value": "female"}]}));

        let page = render(Some(&user)).unwrap();

        assert!(page.contains("<pre id=\"session\">"));
        assert!(page.contains("\"personData\""));
        assert!(page.contains("\"access_token\": \"ya29.token\""));
        assert!(page.contains("href=\"/logout\""));
    }

    #[test]
    fn test_markup_in_profile_is_escaped() {
        let user = user_with_profile(json!({"nickname": "<script>alert('x')</script> & co"}));

        let page = render(Some(&user)).unwrap();

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert('x')&lt;/script&gt; &amp; co"));
    }
}
