pub mod users;
pub mod web;
pub mod words;

use axum::{middleware, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::locale::apply_locale;
use crate::{AppError, AppState, Result};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(web::routes())
        .merge(users::routes())
        .merge(words::routes())
}

/// The full application: routes, static files, locale prefix handling
/// and the HTTP layers.
pub fn build_app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let routes = create_routes()
        .nest_service("/static", static_files)
        .fallback(not_found)
        .with_state(state.clone());

    // The locale prefix has to be removed before routing, so the real
    // router sits behind an outer one whose only job is running the layers.
    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn_with_state(state, apply_locale))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found() -> AppError {
    AppError::not_found("Page")
}

/// Ids and page numbers are digits only; anything else does not match
/// the route and is a 404.
pub(crate) fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::not_found(format!("{} {}", what, raw)));
    }
    raw.parse()
        .map_err(|_| AppError::not_found(format!("{} {}", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i64>("42", "Word").unwrap(), 42);
        assert!(parse_number::<i64>("-1", "Word").is_err());
        assert!(parse_number::<i64>("abc", "Word").is_err());
        assert!(parse_number::<u32>("", "Page").is_err());
        assert!(parse_number::<u32>("99999999999", "Page").is_err());
    }
}
