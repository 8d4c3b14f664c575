//! Auth token cookie and the `Viewer` extractor
//!
//! The backend issues a bearer token on login. Browsers keep it in an
//! HttpOnly cookie; scripts and API clients may send it as
//! `Authorization: Bearer ...` instead.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::api::{ApiError, AppState};
use crate::backend::{BackendError, BackendResult};
use crate::domain::{Role, User};
use crate::ui::PageError;

pub const TOKEN_COOKIE: &str = "catering_token";

/// Auth token from the Authorization header or the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|t| !t.is_empty())
}

/// `Set-Cookie` value storing the token
pub fn session_cookie(token: &str) -> String {
    format!(
        "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        urlencoding::encode(token)
    )
}

/// `Set-Cookie` value removing the token
pub fn clear_session_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Authenticated user of the current request
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    pub token: String,
    pub user: User,
}

impl Viewer {
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Forbidden unless the viewer has one of `roles`
    pub fn require(&self, roles: &[Role]) -> BackendResult<()> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(BackendError::forbidden_for(self.user.role))
        }
    }
}

/// Rejection shaped for the kind of request (JSON API and event stream, or HTML page)
#[derive(Debug)]
pub enum SessionRejection {
    Api(BackendError),
    Page(BackendError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            SessionRejection::Api(err) => ApiError(err).into_response(),
            SessionRejection::Page(err) => PageError(err).into_response(),
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let wants_json = path.starts_with("/api/") || path == "/events";
        let reject = |err| {
            if wants_json {
                SessionRejection::Api(err)
            } else {
                SessionRejection::Page(err)
            }
        };

        let token = token_from_headers(&parts.headers).ok_or_else(|| reject(BackendError::Unauthorized))?;
        let user = state
            .backend
            .current_user(&token)
            .await
            .map_err(reject)?;
        Ok(Viewer { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("catering-theme=dark; catering_token=abc%2E123"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.123"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("catering_token=cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("header"));
    }

    #[test]
    fn empty_cookie_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("catering_token="));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn cookie_is_http_only() {
        let cookie = session_cookie("t0k/en");
        assert!(cookie.starts_with("catering_token=t0k%2Fen;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
