// Server-rendered HTML pages
pub mod forms;
pub mod users;
pub mod words;

use axum::http::StatusCode;

use crate::models::User;
use crate::pagination::Page;

/// What every page needs besides its own content.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub locale: &'a str,
    pub user: Option<&'a User>,
}

impl<'a> ViewContext<'a> {
    pub fn new(locale: &'a str, user: Option<&'a User>) -> Self {
        Self { locale, user }
    }

    pub fn is_current_user(&self, user_id: i64) -> bool {
        self.user.is_some_and(|u| u.id == user_id)
    }
}

/// HTML-escapes text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn navigation(ctx: &ViewContext) -> String {
    let account = match ctx.user {
        Some(user) => format!(
            r#"<a href="/user">{}</a> <a href="/user/edit">Edit profile</a> <a href="/user/logout">Log out</a>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/user/login">Log in</a> <a href="/user/registration">Register</a>"#.to_string(),
    };
    format!(
        r#"<nav class="top"><a href="/" class="brand">Wordbook</a> <a href="/word/new">New word</a> <a href="/search/user">Find users</a><span class="account">{}</span></nav>"#,
        account
    )
}

pub fn layout(ctx: &ViewContext, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{locale}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Wordbook</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        locale = escape(ctx.locale),
        title = escape(title),
        nav = navigation(ctx),
        body = body,
    )
}

pub fn error_page(locale: &str, status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<p class="error-status">{}</p><p>{}</p><p><a href="/">Back to the word list</a></p>"#,
        status.as_u16(),
        escape(message)
    );
    layout(&ViewContext::new(locale, None), title, &body)
}

/// Previous / "page x of y" / next links; `href` maps a page number to its URL.
pub fn pagination_nav<T>(page: &Page<T>, href: impl Fn(u32) -> String) -> String {
    let previous = if page.has_previous() {
        format!(r#"<a rel="prev" href="{}">&laquo; Previous</a>"#, href(page.current_page - 1))
    } else {
        String::new()
    };
    let next = if page.has_next() {
        format!(r#"<a rel="next" href="{}">Next &raquo;</a>"#, href(page.current_page + 1))
    } else {
        String::new()
    };
    format!(
        r#"<nav class="pagination">{} <span>Page {} of {}</span> {}</nav>"#,
        previous,
        page.current_page,
        page.page_count(),
        next
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRequest;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = error_page("de", StatusCode::NOT_FOUND, "<script>");
        assert!(html.contains(r#"<html lang="de">"#));
        assert!(html.contains("Not Found"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_pagination_links() {
        let page = Page::from_vec((1..=12).collect::<Vec<_>>(), PageRequest::new(2, 5).unwrap());
        let nav = pagination_nav(&page, |n| format!("/{}", n));

        assert!(nav.contains(r#"href="/1""#));
        assert!(nav.contains(r#"href="/3""#));
        assert!(nav.contains("Page 2 of 3"));
    }
}
