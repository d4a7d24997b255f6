//! Session extractor for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use portico_core::{SessionKey, Uid};
use portico_session::RequestContext;
use std::convert::Infallible;
use std::sync::Arc;

use crate::app::AppState;
use crate::config::HostingConfig;
use crate::store::SharedSession;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "portico_session";

/// The caller's session, opened on first use.
///
/// A request without a known session cookie gets a new session; `jar` then
/// carries the cookie and must be part of the response.
pub struct CurrentSession {
    pub key: SessionKey,
    pub state: SharedSession,
    pub context: RequestContext,
    pub jar: CookieJar,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let context = request_context(parts, &app_state.hosting);

        let existing = match jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<SessionKey>().ok())
        {
            Some(key) => app_state.sessions.get(&key).await.map(|s| (key, s)),
            None => None,
        };

        if let Some((key, session)) = existing {
            return Ok(Self {
                key,
                state: session,
                context,
                jar,
            });
        }

        let opened = app_state.controller.open_session(&context);
        tracing::debug!(hosting_mode = %opened.hosting_mode(), "opening session");
        let (key, session) = app_state.sessions.insert(opened).await;

        Ok(Self {
            key,
            state: session,
            context,
            jar: jar.add(session_cookie(key, app_state.cookies.secure)),
        })
    }
}

/// Builds the browser-session cookie addressing `key`.
pub(crate) fn session_cookie(key: SessionKey, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, key.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Builds the session operations' view of a request.
fn request_context(parts: &Parts, hosting: &HostingConfig) -> RequestContext {
    let headers = &parts.headers;
    let scheme = header_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = header_value(headers, header::HOST.as_str()).unwrap_or("localhost");
    let path = parts
        .uri
        .path_and_query()
        .map_or("/", |path| path.as_str());

    let remote_user = header_value(headers, &hosting.remote_user_header)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(Uid::new);

    let mut context =
        RequestContext::new(format!("{scheme}://{host}{path}")).with_remote_user(remote_user);
    for name in [
        &hosting.portal_marker_header,
        &hosting.authenticated_user_header,
    ] {
        if let Some(value) = header_value(headers, name) {
            context = context.with_attribute(name, value);
        }
    }
    context
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn context_carries_url_and_configured_headers() {
        let parts = parts(
            Request::builder()
                .uri("/session?tab=prefs")
                .header("host", "app.example.edu")
                .header("x-forwarded-proto", "https")
                .header("x-portal-context", "uportal")
                .header("x-forwarded-user", "alice")
                .header("x-unrelated", "ignored")
                .body(())
                .expect("request"),
        );

        let ctx = request_context(&parts, &HostingConfig::default());

        assert_eq!(ctx.request_url(), "https://app.example.edu/session?tab=prefs");
        assert_eq!(ctx.attribute("x-portal-context"), Some("uportal"));
        assert_eq!(ctx.attribute("x-forwarded-user"), Some("alice"));
        assert_eq!(ctx.attribute("x-unrelated"), None);
        assert!(ctx.remote_user().is_none());
    }

    #[test]
    fn remote_user_comes_from_portal_header() {
        let parts = parts(
            Request::builder()
                .uri("/session")
                .header("x-portal-remote-user", "bob")
                .body(())
                .expect("request"),
        );

        let ctx = request_context(&parts, &HostingConfig::default());

        assert_eq!(ctx.request_url(), "http://localhost/session");
        assert_eq!(ctx.remote_user(), Some(&Uid::new("bob")));
    }

    #[test]
    fn blank_remote_user_is_ignored() {
        let parts = parts(
            Request::builder()
                .uri("/session")
                .header("x-portal-remote-user", " ")
                .body(())
                .expect("request"),
        );

        assert!(
            request_context(&parts, &HostingConfig::default())
                .remote_user()
                .is_none()
        );
    }
}
