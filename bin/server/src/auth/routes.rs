//! Session routes: current user, preferences, and single sign-out.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, Uri, header},
    response::{IntoResponse, Redirect},
};
use portico_session::{RedirectError, RedirectSink, SessionState, UserProfile};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::middleware::{CurrentSession, session_cookie};
use crate::app::AppState;
use crate::error::ApiError;

/// What the UI needs to render the session chrome.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user: Option<UserProfile>,
    pub embedded: bool,
    pub login_available: bool,
    pub logout_available: bool,
    pub accessibility_mode: String,
    pub language: Option<String>,
    pub action: Option<String>,
    pub from_action: Option<String>,
    pub version: String,
    pub site: String,
    /// True if the authenticator or profile store failed for this request.
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct AccessibilityRequest {
    mode: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    language: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    action: String,
}

/// Returns the session as seen by this request.
pub async fn session_info(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> impl IntoResponse {
    let controller = &state.controller;
    let ctx = &session.context;
    let mut guard = session.state.lock().await;

    let resolution = controller.current_user(&mut guard, ctx).await;
    let login_available = controller.is_login_available(&mut guard, ctx).await;
    let logout_available = controller.is_logout_available(&mut guard, ctx).await;
    let accessibility_mode = controller.accessibility_mode(&mut guard, ctx).await;

    let info = SessionInfo {
        embedded: guard.is_embedded(),
        login_available,
        logout_available,
        accessibility_mode,
        language: resolution
            .user()
            .and_then(UserProfile::language)
            .or_else(|| guard.language())
            .map(str::to_string),
        action: guard.action().map(str::to_string),
        from_action: guard.from_action().map(str::to_string),
        version: controller.config().version().to_string(),
        site: controller.config().site().to_string(),
        degraded: resolution.is_degraded(),
        user: resolution.into_user(),
    };
    drop(guard);

    (session.jar, Json(info))
}

/// Sets the accessibility mode of the signed-in user, or of the session.
pub async fn set_accessibility(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<AccessibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut guard = session.state.lock().await;
    let saved = state
        .controller
        .set_accessibility_mode(&mut guard, &session.context, body.mode)
        .await;
    drop(guard);

    if !saved {
        return Err(ApiError::ProfileNotSaved);
    }
    Ok((session.jar, Json(serde_json::json!({ "saved": true }))))
}

/// Sets the UI language of the session and the signed-in user.
pub async fn set_language(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<LanguageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut guard = session.state.lock().await;
    let saved = state
        .controller
        .set_language(&mut guard, &session.context, body.language)
        .await;
    drop(guard);

    if !saved {
        return Err(ApiError::ProfileNotSaved);
    }
    Ok((session.jar, Json(serde_json::json!({ "saved": true }))))
}

/// Records the UI action the session navigated to. The current action
/// becomes the from-action.
pub async fn set_action(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(body): Json<ActionRequest>,
) -> impl IntoResponse {
    let mut guard = session.state.lock().await;
    // Resolve first so an identity change resets before the new action lands.
    state
        .controller
        .current_user(&mut guard, &session.context)
        .await;
    let previous = guard.action().map(str::to_string);
    guard.set_from_action(previous);
    guard.set_action(Some(body.action));
    let response = serde_json::json!({
        "action": guard.action(),
        "from_action": guard.from_action(),
    });
    drop(guard);

    (session.jar, Json(response))
}

/// Logs the session out and redirects to the single sign-out URL.
///
/// The return URL is derived from the page the logout was requested from
/// (`Referer`, when it is on this host), falling back to this request's URL.
/// The fresh session is registered under a new key and the old cookie stops
/// addressing anything. If the sign-out URL cannot be used as a redirect
/// target, the client goes to the local landing page instead.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: CurrentSession,
) -> impl IntoResponse {
    let ctx = match same_host_referer(&headers) {
        Some(referer) => session.context.clone().with_request_url(referer),
        None => session.context.clone(),
    };

    let mut sink = LocationRedirect::default();
    let mut guard = session.state.lock().await;
    let outcome = state.controller.logout(&mut guard, &ctx, &mut sink);
    let fresh = SessionState::clone(&guard);
    drop(guard);

    state.sessions.remove(&session.key).await;
    let (key, _) = state.sessions.insert(fresh).await;
    let jar = session
        .jar
        .add(session_cookie(key, state.cookies.secure));

    let location = match sink.into_location() {
        Some(location) if outcome.redirected => location,
        _ => landing_location(state.controller.config().landing_page()),
    };

    (jar, Redirect::to(&location))
}

/// Returns the `Referer` when it names the host this request was sent to.
fn same_host_referer(headers: &HeaderMap) -> Option<&str> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let uri: Uri = referer.parse().ok()?;
    uri.authority()
        .is_some_and(|authority| authority.as_str().eq_ignore_ascii_case(host))
        .then_some(referer)
}

fn landing_location(landing_page: &str) -> String {
    let mut sink = LocationRedirect::default();
    match sink.redirect(&format!("/{landing_page}")) {
        Ok(()) => sink.into_location().unwrap_or_else(|| "/".to_string()),
        Err(_) => "/".to_string(),
    }
}

/// Redirect sink accepting only targets usable as a `Location` header.
#[derive(Debug, Default)]
pub struct LocationRedirect {
    location: Option<String>,
}

impl LocationRedirect {
    #[must_use]
    pub fn into_location(self) -> Option<String> {
        self.location
    }
}

impl RedirectSink for LocationRedirect {
    fn redirect(&mut self, url: &str) -> Result<(), Report<RedirectError>> {
        if self.location.is_some() {
            return Err(RedirectError::AlreadyRedirected.into());
        }
        HeaderValue::from_str(url).map_err(|e| RedirectError::InvalidTarget {
            target: url.to_string(),
            reason: e.to_string(),
        })?;
        self.location = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_redirect_accepts_ascii_url() {
        let mut sink = LocationRedirect::default();
        sink.redirect("https://cas.example.edu/cas/logout?service=https%3A%2F%2Fapp%2Fwelcome")
            .expect("valid");
        assert_eq!(
            sink.into_location().as_deref(),
            Some("https://cas.example.edu/cas/logout?service=https%3A%2F%2Fapp%2Fwelcome")
        );
    }

    #[test]
    fn location_redirect_rejects_non_header_values() {
        let mut sink = LocationRedirect::default();
        let err = sink.redirect("https://sso.example.edu/déconnexion?r=%s").unwrap_err();
        assert!(err.to_string().contains("cannot redirect"));
        assert!(sink.into_location().is_none());
    }

    #[test]
    fn location_redirect_only_once() {
        let mut sink = LocationRedirect::default();
        sink.redirect("/welcome").expect("first");
        assert!(sink.redirect("/other").is_err());
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(name, value)| (name.clone(), HeaderValue::from_str(value).expect("header")))
            .collect()
    }

    #[test]
    fn referer_on_same_host_is_used() {
        let headers = headers(&[
            (header::HOST, "app.example.edu"),
            (header::REFERER, "https://App.Example.edu/portico/grades"),
        ]);
        assert_eq!(
            same_host_referer(&headers),
            Some("https://App.Example.edu/portico/grades")
        );
    }

    #[test]
    fn referer_on_other_host_is_ignored() {
        let headers = headers(&[
            (header::HOST, "app.example.edu"),
            (header::REFERER, "https://attacker.example.com/portico/grades"),
        ]);
        assert!(same_host_referer(&headers).is_none());
    }

    #[test]
    fn referer_without_host_header_is_ignored() {
        let headers = headers(&[(header::REFERER, "https://app.example.edu/portico/grades")]);
        assert!(same_host_referer(&headers).is_none());
    }

    #[test]
    fn landing_location_falls_back_to_root() {
        assert_eq!(landing_location("welcome"), "/welcome");
        assert_eq!(landing_location("bad\nvalue"), "/");
    }
}
