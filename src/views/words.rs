use super::forms::{form, input, select};
use super::{escape, layout, pagination_nav, ViewContext};
use crate::forms::{FormState, WordForm};
use crate::models::{Language, Word, WordRef};
use crate::pagination::Page;

/// Choices the word form offers.
pub struct WordChoices<'a> {
    pub languages: &'a [Language],
    pub translations: &'a [WordRef],
}

fn language_label(word: &Word) -> String {
    word.language
        .as_ref()
        .map(|l| escape(&l.name))
        .unwrap_or_else(|| r#"<span class="empty">none</span>"#.to_string())
}

fn translation_links(word: &Word) -> String {
    if word.translations().is_empty() {
        return r#"<span class="empty">none</span>"#.to_string();
    }
    word.translations()
        .iter()
        .map(|t| format!(r#"<a href="/word/{}">{}</a>"#, t.id, escape(&t.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn word_fields(state: &FormState<WordForm>, choices: &WordChoices) -> Vec<String> {
    let mut languages = vec![(String::new(), "(none)".to_string())];
    languages.extend(choices.languages.iter().map(|l| (l.id.to_string(), l.name.clone())));
    let translations: Vec<(String, String)> = choices
        .translations
        .iter()
        .map(|t| (t.id.to_string(), t.name.clone()))
        .collect();

    vec![
        input("text", "name", "Name", &state.data.name, &state.errors),
        select(
            "language_id",
            "Language",
            &languages,
            std::slice::from_ref(&state.data.language_id),
            false,
            &state.errors,
        ),
        select(
            "translations",
            "Translations",
            &translations,
            &state.data.translations,
            true,
            &state.errors,
        ),
    ]
}

/// POSTs with a `_method=DELETE` override.
pub fn delete_form(word_id: i64) -> String {
    format!(
        r#"<form method="post" action="/word/{}" class="delete"><input type="hidden" name="_method" value="DELETE"><button type="submit">Delete</button></form>"#,
        word_id
    )
}

pub fn index_page(ctx: &ViewContext, page: &Page<Word>) -> String {
    let rows: String = page
        .items
        .iter()
        .map(|word| {
            format!(
                r#"<tr><td><a href="/word/{id}">{name}</a></td><td>{language}</td><td>{translations}</td><td><a href="/word/{id}/edit">edit</a></td></tr>"#,
                id = word.id,
                name = escape(&word.name),
                language = language_label(word),
                translations = translation_links(word),
            )
        })
        .collect();

    let table = if page.is_empty() {
        r#"<p class="empty">No words here.</p>"#.to_string()
    } else {
        format!(
            r#"<table class="words"><thead><tr><th>Word</th><th>Language</th><th>Translations</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
            rows
        )
    };

    let body = format!(
        r#"{}{}<p><a href="/word/new">Add a word</a></p>"#,
        table,
        pagination_nav(page, |n| format!("/{}", n))
    );
    layout(ctx, "Words", &body)
}

pub fn new_page(ctx: &ViewContext, state: &FormState<WordForm>, choices: &WordChoices) -> String {
    let body = form("/word/new", &word_fields(state, choices), "Create");
    layout(ctx, "New word", &body)
}

pub fn show_page(ctx: &ViewContext, word: &Word) -> String {
    let body = format!(
        r#"<dl class="word"><dt>Name</dt><dd>{}</dd><dt>Language</dt><dd>{}</dd><dt>Translations</dt><dd>{}</dd></dl><p><a href="/word/{}/edit">Edit</a> · <a href="/">Back to the list</a></p>{}"#,
        escape(&word.name),
        language_label(word),
        translation_links(word),
        word.id,
        delete_form(word.id)
    );
    layout(ctx, &word.name, &body)
}

pub fn edit_page(ctx: &ViewContext, word: &Word, state: &FormState<WordForm>, choices: &WordChoices) -> String {
    let action = format!("/word/{}/edit", word.id);
    let body = format!(
        r#"{}<p><a href="/word/{}">Show</a> · <a href="/">Back to the list</a></p>{}"#,
        form(&action, &word_fields(state, choices), "Update"),
        word.id,
        delete_form(word.id)
    );
    layout(ctx, &format!("Edit {}", word.name), &body)
}
