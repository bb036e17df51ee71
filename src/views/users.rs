use super::forms::{alert, form, input, select};
use super::{escape, layout, pagination_nav, ViewContext};
use crate::forms::{EditUserForm, FormErrors, FormState, RegisterUserForm};
use crate::models::{Category, Post, RecentComment, User};
use crate::pagination::Page;
use crate::services::SearchResult;

fn locale_options(locales: &[String]) -> Vec<(String, String)> {
    locales.iter().map(|l| (l.clone(), l.to_uppercase())).collect()
}

fn user_summary(user: &User) -> String {
    format!(
        r#"<dl class="user"><dt>Username</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd><dt>Language</dt><dd>{}</dd><dt>Member since</dt><dd>{}</dd></dl>"#,
        escape(&user.username),
        escape(&user.email),
        escape(&user.language),
        user.created_at.format("%Y-%m-%d")
    )
}

fn post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return r#"<p class="empty">No posts yet.</p>"#.to_string();
    }
    let items: String = posts
        .iter()
        .map(|post| {
            let pending = if post.is_approved {
                ""
            } else {
                r#" <span class="badge">awaiting approval</span>"#
            };
            format!(
                r#"<li><h3>{}{}</h3><p>{}</p></li>"#,
                escape(&post.title),
                pending,
                escape(&post.excerpt(200))
            )
        })
        .collect();
    format!(r#"<ul class="posts">{}</ul>"#, items)
}

pub fn index_page(ctx: &ViewContext, user: &User) -> String {
    let body = format!(
        r#"{}<p><a href="/user/{}">Public profile</a> · <a href="/user/{}/posts/1">My posts</a></p>"#,
        user_summary(user),
        user.id,
        user.id
    );
    layout(ctx, "My account", &body)
}

pub fn show_page(ctx: &ViewContext, user: &User, posts: &[Post], comments: &[RecentComment]) -> String {
    let comment_items: String = comments
        .iter()
        .map(|c| {
            format!(
                r#"<li><strong>{}</strong>: {}</li>"#,
                escape(&c.post_title),
                escape(&c.content)
            )
        })
        .collect();
    let comment_block = if comments.is_empty() {
        r#"<p class="empty">No comments yet.</p>"#.to_string()
    } else {
        format!(r#"<ul class="comments">{}</ul>"#, comment_items)
    };

    let body = format!(
        r#"{}<section><h2>Posts</h2>{}<p><a href="/user/{}/posts/1">All posts</a></p></section><section><h2>Last commented posts</h2>{}</section>"#,
        user_summary(user),
        post_list(posts),
        user.id,
        comment_block
    );
    layout(ctx, &user.username, &body)
}

pub fn login_page(ctx: &ViewContext, last_username: &str, error: Option<&str>) -> String {
    let none = FormErrors::new();
    let fields = [
        input("text", "username", "Username or email", last_username, &none),
        input("password", "password", "Password", "", &none),
    ];
    let body = format!(
        r#"{}{}<p>No account yet? <a href="/user/registration">Register</a></p>"#,
        error.map(alert).unwrap_or_default(),
        form("/user/login", &fields, "Log in")
    );
    layout(ctx, "Log in", &body)
}

pub fn registration_page(ctx: &ViewContext, state: &FormState<RegisterUserForm>, locales: &[String]) -> String {
    let data = &state.data;
    let errors = &state.errors;
    let fields = [
        input("text", "username", "Username", &data.username, errors),
        input("email", "email", "Email", &data.email, errors),
        input("password", "password", "Password", "", errors),
        input("password", "password_confirmation", "Repeat password", "", errors),
        select(
            "language",
            "Language",
            &locale_options(locales),
            std::slice::from_ref(&data.language),
            false,
            errors,
        ),
    ];
    layout(ctx, "Register", &form("/user/registration", &fields, "Create account"))
}

pub fn edit_page(ctx: &ViewContext, state: &FormState<EditUserForm>, locales: &[String]) -> String {
    let data = &state.data;
    let errors = &state.errors;
    let fields = [
        input("text", "username", "Username", &data.username, errors),
        input("email", "email", "Email", &data.email, errors),
        select(
            "language",
            "Language",
            &locale_options(locales),
            std::slice::from_ref(&data.language),
            false,
            errors,
        ),
        input("password", "new_password", "New password (optional)", "", errors),
        input("password", "current_password", "Current password", "", errors),
    ];
    layout(ctx, "Edit profile", &form("/user/edit", &fields, "Save"))
}

pub fn search_page(ctx: &ViewContext, result: &SearchResult, categories: &[Category]) -> String {
    let search_form = form(
        "/search/user",
        &[input("search", "query", "Search users", &result.form.data.query, &result.form.errors)],
        "Search",
    );

    let results = match &result.users {
        Some(users) if users.is_empty() => r#"<p class="empty">No users found.</p>"#.to_string(),
        Some(users) => {
            let items: String = users
                .iter()
                .map(|u| format!(r#"<li><a href="/user/{}">{}</a></li>"#, u.id, escape(&u.username)))
                .collect();
            format!(r#"<ul class="users">{}</ul>"#, items)
        }
        None => String::new(),
    };

    let category_items: String = categories
        .iter()
        .map(|c| format!("<li>{}</li>", escape(&c.name)))
        .collect();

    let body = format!(
        r#"{}{}<aside><h2>Categories</h2><ul class="categories">{}</ul></aside>"#,
        search_form, results, category_items
    );
    layout(ctx, "Find users", &body)
}

pub fn posts_page(ctx: &ViewContext, owner: &User, page: &Page<Post>) -> String {
    let owner_id = owner.id;
    let body = format!(
        "{}{}",
        post_list(&page.items),
        pagination_nav(page, |n| format!("/user/{}/posts/{}", owner_id, n))
    );
    layout(ctx, &format!("Posts by {}", owner.username), &body)
}
