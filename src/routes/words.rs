// Word dictionary pages
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use super::parse_number;
use crate::auth::CurrentUser;
use crate::forms::{DeleteForm, FormOutcome, FormState, WordForm};
use crate::locale::Locale;
use crate::models::Word;
use crate::views::{self, words::WordChoices, ViewContext};
use crate::{AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/:page", get(index_page))
        .route("/word/new", get(new_word).post(create_word))
        .route(
            "/word/:id",
            get(show_word).post(delete_word_form).delete(delete_word),
        )
        .route("/word/:id/edit", get(edit_word).post(update_word))
}

async fn index(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    render_index(&state, 1, &ViewContext::new(&locale, user.as_ref())).await
}

async fn index_page(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Path(page): Path<String>,
) -> Result<Html<String>> {
    let page = parse_number(&page, "Page")?;
    render_index(&state, page, &ViewContext::new(&locale, user.as_ref())).await
}

async fn render_index(state: &AppState, page: u32, ctx: &ViewContext<'_>) -> Result<Html<String>> {
    let words = state.word_service.list_page(page).await?;
    Ok(Html(views::words::index_page(ctx, &words)))
}

async fn render_new(state: &AppState, ctx: &ViewContext<'_>, form: &FormState<WordForm>) -> Result<Response> {
    let languages = state.word_service.languages().await?;
    let translations = state.word_service.translation_options(None).await?;
    let choices = WordChoices {
        languages: &languages,
        translations: &translations,
    };
    Ok((form.status(), Html(views::words::new_page(ctx, form, &choices))).into_response())
}

async fn render_edit(
    state: &AppState,
    ctx: &ViewContext<'_>,
    word: &Word,
    form: &FormState<WordForm>,
) -> Result<Response> {
    let languages = state.word_service.languages().await?;
    let translations = state.word_service.translation_options(Some(word.id)).await?;
    let choices = WordChoices {
        languages: &languages,
        translations: &translations,
    };
    Ok((form.status(), Html(views::words::edit_page(ctx, word, form, &choices))).into_response())
}

async fn new_word(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Response> {
    let ctx = ViewContext::new(&locale, user.as_ref());
    match state.form_manager.word(None, None).await? {
        FormOutcome::Render(form) => render_new(&state, &ctx, &form).await,
        FormOutcome::Success(word) => Ok(Redirect::to(&format!("/word/{}", word.id)).into_response()),
    }
}

async fn create_word(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let ctx = ViewContext::new(&locale, user.as_ref());
    let submission = WordForm::from_pairs(pairs);
    match state.form_manager.word(None, Some(submission)).await? {
        FormOutcome::Success(word) => Ok(Redirect::to(&format!("/word/{}", word.id)).into_response()),
        FormOutcome::Render(form) => render_new(&state, &ctx, &form).await,
    }
}

async fn show_word(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let word = state.word_service.find_word(parse_number(&id, "Word")?).await?;
    let ctx = ViewContext::new(&locale, user.as_ref());
    Ok(Html(views::words::show_page(&ctx, &word)))
}

async fn edit_word(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let word = state.word_service.find_word(parse_number(&id, "Word")?).await?;
    let ctx = ViewContext::new(&locale, user.as_ref());
    match state.form_manager.word(Some(&word), None).await? {
        FormOutcome::Render(form) => render_edit(&state, &ctx, &word, &form).await,
        FormOutcome::Success(word) => Ok(Redirect::to(&format!("/word/{}/edit", word.id)).into_response()),
    }
}

async fn update_word(
    State(state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let word = state.word_service.find_word(parse_number(&id, "Word")?).await?;
    let ctx = ViewContext::new(&locale, user.as_ref());
    let submission = WordForm::from_pairs(pairs);
    match state.form_manager.word(Some(&word), Some(submission)).await? {
        FormOutcome::Success(updated) => {
            Ok(Redirect::to(&format!("/word/{}/edit", updated.id)).into_response())
        }
        FormOutcome::Render(form) => render_edit(&state, &ctx, &word, &form).await,
    }
}

/// HTML forms cannot send DELETE, so the delete form posts here with a
/// `_method` override.
async fn delete_word_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect> {
    let word = state.word_service.find_word(parse_number(&id, "Word")?).await?;
    state.form_manager.delete_word(word.id, &form).await?;
    Ok(Redirect::to("/"))
}

async fn delete_word(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = parse_number(&id, "Word")?;
    let form = DeleteForm {
        method: "DELETE".to_string(),
    };
    state.form_manager.delete_word(id, &form).await?;
    Ok(Redirect::to("/"))
}
