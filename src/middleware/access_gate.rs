//! Studio access gate.
//!
//! Requests under a protected prefix move through three states: no valid
//! session (redirect to login with a callback), a session without the admin
//! role (403), or an admin session (forwarded with its claims attached).

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::auth::{Claims, SessionError, SessionVerifier};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum AccessState {
    Unauthenticated,
    Member(Claims),
    Admin(Claims),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// 302 to this location
    Redirect(String),
    /// 403, empty body
    Forbidden,
    /// pass through to the studio surface
    Forward(Claims),
}

/// Admin claims of the current request, set by the gate.
#[derive(Debug, Clone)]
pub struct StudioUser(pub Claims);

pub fn is_protected(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        path == prefix
            || path
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.starts_with('/'))
                .unwrap_or(false)
    })
}

/// Session token from the session cookie, falling back to a bearer header.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"').to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

/// Establish the access state. Only verifier breakage is an error; every kind
/// of bad token simply means "unauthenticated".
pub fn classify(token: Option<&str>, verifier: &SessionVerifier) -> Result<AccessState, SessionError> {
    let Some(token) = token else {
        return Ok(AccessState::Unauthenticated);
    };
    match verifier.verify(token) {
        Ok(claims) if verifier.is_admin(&claims) => Ok(AccessState::Admin(claims)),
        Ok(claims) => Ok(AccessState::Member(claims)),
        Err(SessionError::Invalid(reason)) => {
            debug!(reason = %reason, "session token rejected");
            Ok(AccessState::Unauthenticated)
        }
        Err(e) => Err(e),
    }
}

pub fn login_redirect(login_path: &str, callback: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("{}?{}", login_path, query)
}

pub fn decide(state: AccessState, requested: &str, login_path: &str) -> GateDecision {
    match state {
        AccessState::Unauthenticated => GateDecision::Redirect(login_redirect(login_path, requested)),
        AccessState::Member(_) => GateDecision::Forbidden,
        AccessState::Admin(claims) => GateDecision::Forward(claims),
    }
}

/// Middleware guarding the configured studio prefixes.
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let security = &state.config.security;
    let path = request.uri().path();
    if !is_protected(path, &security.protected_prefixes) {
        return next.run(request).await;
    }

    let requested = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.to_string());

    let token = extract_token(request.headers(), &security.session_cookie);
    let access = match classify(token.as_deref(), &state.sessions) {
        Ok(access) => access,
        Err(e) => {
            error!(error = %e, "studio session verification failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match decide(access, &requested, &security.login_path) {
        GateDecision::Redirect(location) => {
            debug!(path = %requested, "unauthenticated studio request");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        GateDecision::Forbidden => {
            warn!(path = %requested, "studio request without admin role");
            StatusCode::FORBIDDEN.into_response()
        }
        GateDecision::Forward(claims) => {
            request.extensions_mut().insert(StudioUser(claims));
            next.run(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use axum::http::HeaderValue;

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(&SecurityConfig {
            session_secret: "gate-secret".to_string(),
            session_cookie: "session_token".to_string(),
            session_expiry_hours: 1,
            admin_role: "admin".to_string(),
            protected_prefixes: vec!["/studio".to_string()],
            login_path: "/login".to_string(),
            revalidate_secret: None,
        })
    }

    #[test]
    fn prefix_matching_respects_segment_boundaries() {
        let prefixes = vec!["/studio".to_string()];
        assert!(is_protected("/studio", &prefixes));
        assert!(is_protected("/studio/desk/project", &prefixes));
        assert!(!is_protected("/studios", &prefixes));
        assert!(!is_protected("/about", &prefixes));
    }

    #[test]
    fn token_comes_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session_token=abc.def.ghi"));
        assert_eq!(extract_token(&headers, "session_token").as_deref(), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers, "session_token").as_deref(), Some("xyz"));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        assert_eq!(extract_token(&headers, "session_token"), None);
    }

    #[test]
    fn unauthenticated_redirects_with_callback() {
        let decision = decide(AccessState::Unauthenticated, "/studio/desk?tab=1", "/login");
        let GateDecision::Redirect(location) = decision else {
            panic!("expected redirect");
        };
        let url = url::Url::parse(&format!("http://localhost{}", location)).unwrap();
        assert_eq!(url.path(), "/login");
        let callback = url.query_pairs().find(|(k, _)| k == "callbackUrl").map(|(_, v)| v.into_owned());
        assert_eq!(callback.as_deref(), Some("/studio/desk?tab=1"));
    }

    #[test]
    fn classify_maps_roles_to_states() {
        let v = verifier();
        let admin = v.issue("a", None, "admin").unwrap();
        let editor = v.issue("e", None, "editor").unwrap();

        assert!(matches!(classify(Some(admin.as_str()), &v), Ok(AccessState::Admin(_))));
        assert!(matches!(classify(Some(editor.as_str()), &v), Ok(AccessState::Member(_))));
        assert_eq!(classify(None, &v).unwrap(), AccessState::Unauthenticated);
        assert_eq!(classify(Some("forged"), &v).unwrap(), AccessState::Unauthenticated);
    }

    #[test]
    fn members_are_forbidden_admins_forwarded() {
        let v = verifier();
        let claims = v.verify(&v.issue("e", None, "editor").unwrap()).unwrap();
        assert_eq!(decide(AccessState::Member(claims.clone()), "/studio", "/login"), GateDecision::Forbidden);
        assert_eq!(decide(AccessState::Admin(claims.clone()), "/studio", "/login"), GateDecision::Forward(claims));
    }
}
