//! Outbound error hygiene.
//!
//! Transport errors are surfaced to the caller and to logs, so any URL they mention is reduced to
//! scheme, host, and path first (credentials, query, and fragment can carry secrets).

use url::Url;

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

/// Render a `reqwest` error with its full cause chain and any URL redacted.
///
/// `reqwest`'s own message is terse ("error sending request"); the underlying cause (connection
/// refused, DNS failure, certificate error) lives in the source chain.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_drops_credentials_query_and_fragment() {
        let url = Url::parse("https://user:pw@api.example.com/v1/users?token=abc#frag").expect("url");
        assert_eq!(redact_url(&url), "https://api.example.com/v1/users");
    }

    #[tokio::test]
    async fn reqwest_errors_include_cause_and_hide_query() {
        // Grab a free port, then release it so the connect is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{port}/x?api_key=secret"))
            .send()
            .await
            .unwrap_err();
        let msg = sanitize_reqwest_error(&err);
        assert!(!msg.contains("secret"), "{msg}");
        assert!(msg.contains(&format!("127.0.0.1:{port}")), "{msg}");
    }
}
