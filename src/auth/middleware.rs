// Session cookies and the extractors that resolve them to a user
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;

use crate::models::User;
use crate::{AppError, AppState};

pub const AUTH_COOKIE: &str = "auth_token";
pub const LOCALE_COOKIE: &str = "_locale";

const LOGIN_PATH: &str = "/user/login";
const LOCALE_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Value of the first cookie called `name` across all Cookie headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE,
        token,
        ttl.num_seconds()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
}

pub fn locale_cookie(locale: &str) -> String {
    format!(
        "{}={}; Path=/; SameSite=Lax; Max-Age={}",
        LOCALE_COOKIE, locale, LOCALE_COOKIE_MAX_AGE
    )
}

/// The signed-in user, if any. A missing, expired or forged token, or one
/// pointing at a deleted account, all resolve to `None`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = read_cookie(&parts.headers, AUTH_COOKIE) else {
            return Ok(CurrentUser(None));
        };

        let claims = match state.auth_service.verify_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Ignoring session cookie: {}", e);
                return Ok(CurrentUser(None));
            }
        };

        let user = state.user_service.get_user(claims.user_id).await?;
        Ok(CurrentUser(user))
    }
}

/// Like [`CurrentUser`] but required; anonymous requests are sent to the
/// login page.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(CurrentUser(Some(user))) => Ok(AuthenticatedUser(user)),
            Ok(CurrentUser(None)) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_read_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; _locale=fr"));
        headers.append(header::COOKIE, HeaderValue::from_static("auth_token=abc.def.ghi"));

        assert_eq!(read_cookie(&headers, LOCALE_COOKIE).as_deref(), Some("fr"));
        assert_eq!(read_cookie(&headers, AUTH_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", Duration::hours(2));
        assert!(cookie.starts_with("auth_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=7200"));

        assert!(clear_session_cookie().contains("Max-Age=0"));
        assert!(locale_cookie("de").starts_with("_locale=de;"));
    }
}
