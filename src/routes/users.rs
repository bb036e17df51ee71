// Account pages: profile, session, registration, search, posts
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use super::parse_number;
use crate::auth::middleware::{clear_session_cookie, locale_cookie, session_cookie};
use crate::auth::{AuthenticatedUser, CurrentUser};
use crate::forms::{EditUserForm, FormOutcome, LoginForm, RegisterUserForm, SearchUserForm};
use crate::locale::Locale;
use crate::models::User;
use crate::pagination::{PageRequest, USER_POSTS_PER_PAGE};
use crate::views::{self, ViewContext};
use crate::{AppError, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(index))
        .route("/user/:id", get(show))
        .route("/user/login", get(login_form).post(login))
        .route("/user/logout", get(logout))
        .route("/user/registration", get(registration_form).post(register))
        .route("/user/edit", get(edit_form).post(edit))
        .route("/search/user", get(search_form).post(search))
        .route("/user/:id/posts/:page", get(posts))
}

async fn index(Locale(locale): Locale, AuthenticatedUser(user): AuthenticatedUser) -> Html<String> {
    let ctx = ViewContext::new(&locale, Some(&user));
    Html(views::users::index_page(&ctx, &user))
}

async fn show(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let user = state.user_service.find_user(parse_number(&id, "User")?).await?;
    let posts = state.post_service.approved_posts(user.id).await?;
    let comments = state.comment_service.last_comments(user.id).await?;

    let ctx = ViewContext::new(&locale, viewer.as_ref());
    Ok(Html(views::users::show_page(&ctx, &user, &posts, &comments)))
}

async fn login_form(Locale(locale): Locale, CurrentUser(user): CurrentUser) -> Html<String> {
    let last_username = user.as_ref().map(|u| u.username.as_str()).unwrap_or_default();
    let ctx = ViewContext::new(&locale, user.as_ref());
    Html(views::users::login_page(&ctx, last_username, None))
}

async fn login(
    State(state): State<AppState>,
    Locale(locale): Locale,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.user_service.authenticate(&form.username, &form.password).await {
        Ok(user) => start_session(&state, &user, &locale),
        Err(AppError::AuthError(message)) => {
            tracing::info!("Failed login for {:?}", form.username);
            let ctx = ViewContext::new(&locale, None);
            let page = views::users::login_page(&ctx, form.username.trim(), Some(&message));
            Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Sets the session and locale cookies and sends the user to their account
/// page. Login keeps the locale it was submitted under; registration uses
/// the language chosen on the form.
fn start_session(state: &AppState, user: &User, locale: &str) -> Result<Response> {
    let token = state.user_service.issue_session(user)?;
    let cookies = [
        (header::SET_COOKIE, session_cookie(&token, state.auth_service.session_ttl())),
        (header::SET_COOKIE, locale_cookie(locale)),
    ];
    tracing::info!("User {} signed in", user.id);
    Ok((AppendHeaders(cookies), Redirect::to("/user")).into_response())
}

async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Redirect::to("/"),
    )
}

async fn registration_form(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    let ctx = ViewContext::new(&locale, user.as_ref());
    match state.form_manager.registration(None, &locale).await? {
        FormOutcome::Render(form) => {
            let page = views::users::registration_page(&ctx, &form, &state.config.supported_locales);
            Ok((form.status(), Html(page)).into_response())
        }
        FormOutcome::Success(user) => start_session(&state, &user, &user.language),
    }
}

async fn register(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Form(form): Form<RegisterUserForm>,
) -> Result<Response> {
    match state.form_manager.registration(Some(form), &locale).await? {
        FormOutcome::Success(created) => start_session(&state, &created, &created.language),
        FormOutcome::Render(form) => {
            let ctx = ViewContext::new(&locale, user.as_ref());
            let page = views::users::registration_page(&ctx, &form, &state.config.supported_locales);
            Ok((form.status(), Html(page)).into_response())
        }
    }
}

async fn edit_form(
    State(state): State<AppState>,
    Locale(locale): Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response> {
    handle_edit(&state, &locale, user, None).await
}

async fn edit(
    State(state): State<AppState>,
    Locale(locale): Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(form): Form<EditUserForm>,
) -> Result<Response> {
    handle_edit(&state, &locale, user, Some(form)).await
}

async fn handle_edit(
    state: &AppState,
    locale: &str,
    user: User,
    submission: Option<EditUserForm>,
) -> Result<Response> {
    match state.form_manager.edit_user(user.clone(), submission).await? {
        FormOutcome::Success(url) => Ok(Redirect::to(&url).into_response()),
        FormOutcome::Render(form) => {
            let ctx = ViewContext::new(locale, Some(&user));
            let page = views::users::edit_page(&ctx, &form, &state.config.supported_locales);
            Ok((form.status(), Html(page)).into_response())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

/// A GET carrying `?query=` counts as a submission.
async fn search_form(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Query(params): Query<SearchQuery>,
) -> Result<Response> {
    let submission = params.query.map(|query| SearchUserForm { query });
    handle_search(&state, &locale, user.as_ref(), submission).await
}

async fn search(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SearchUserForm>,
) -> Result<Response> {
    handle_search(&state, &locale, user.as_ref(), Some(form)).await
}

async fn handle_search(
    state: &AppState,
    locale: &str,
    viewer: Option<&User>,
    submission: Option<SearchUserForm>,
) -> Result<Response> {
    let result = state.form_manager.search_users(submission).await?;
    let categories = state.post_service.categories().await?;
    let ctx = ViewContext::new(locale, viewer);
    let page = views::users::search_page(&ctx, &result, &categories);
    Ok((result.form.status(), Html(page)).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct PostsQuery {
    page: Option<String>,
}

async fn posts(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(viewer): CurrentUser,
    Path((id, page)): Path<(String, String)>,
    Query(params): Query<PostsQuery>,
) -> Result<Html<String>> {
    let owner = state.user_service.find_user(parse_number(&id, "User")?).await?;
    let page = match params.page {
        Some(raw) => parse_number(&raw, "Page")?,
        None => parse_number(&page, "Page")?,
    };
    let request = PageRequest::new(page, USER_POSTS_PER_PAGE)?;

    let ctx = ViewContext::new(&locale, viewer.as_ref());
    let posts = state
        .post_service
        .user_posts_page(owner.id, ctx.is_current_user(owner.id), request)
        .await?;
    Ok(Html(views::users::posts_page(&ctx, &owner, &posts)))
}
