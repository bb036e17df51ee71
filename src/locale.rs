// Request locale: `/{_locale}/...` prefix, then cookie, then default
use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, uri::PathAndQuery, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};

use crate::auth::middleware::{read_cookie, LOCALE_COOKIE};
use crate::config::AppConfig;
use crate::error::ErrorMessage;
use crate::{views, AppState};

/// Locale taken from the path prefix, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathLocale(String);

/// Strips a leading supported-locale segment so `/fr/user/login` routes
/// like `/user/login`, then renders error pages in the request's locale.
pub async fn apply_locale(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some((locale, path)) = split_locale(request.uri().path(), &state.config.supported_locales) {
        match rewrite_path(request.uri(), &path) {
            Some(uri) => {
                tracing::debug!("Locale prefix {} stripped, routing {}", locale, path);
                *request.uri_mut() = uri;
                request.extensions_mut().insert(PathLocale(locale));
            }
            None => tracing::warn!("Could not rewrite {} without its locale", request.uri()),
        }
    }

    let locale = resolve(
        request.extensions().get::<PathLocale>(),
        request.headers(),
        &state.config,
    );
    localize_error_page(next.run(request).await, &locale)
}

fn resolve(path_locale: Option<&PathLocale>, headers: &HeaderMap, config: &AppConfig) -> String {
    if let Some(PathLocale(locale)) = path_locale {
        return locale.clone();
    }
    read_cookie(headers, LOCALE_COOKIE)
        .filter(|locale| config.is_supported_locale(locale))
        .unwrap_or_else(|| config.default_locale.clone())
}

fn localize_error_page(response: Response, locale: &str) -> Response {
    let Some(ErrorMessage(message)) = response.extensions().get::<ErrorMessage>().cloned() else {
        return response;
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let html = views::error_page(locale, parts.status, &message);
    Response::from_parts(parts, Body::from(html))
}

fn split_locale(path: &str, supported: &[String]) -> Option<(String, String)> {
    let trimmed = path.strip_prefix('/')?;
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, format!("/{}", rest)),
        None => (trimmed, "/".to_string()),
    };
    supported
        .iter()
        .any(|locale| locale == first)
        .then(|| (first.to_string(), rest))
}

fn rewrite_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// The locale for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Locale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Locale(resolve(
            parts.extensions.get::<PathLocale>(),
            &parts.headers,
            &state.config,
        )))
    }
}
