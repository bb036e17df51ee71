mod common;

use axum::http::StatusCode;
use common::*;
use wordbook_app::models::{NewComment, NewPost};

#[tokio::test]
async fn test_account_page_requires_login() {
    let (app, _) = test_app().await;

    let response = send(&app, get("/user", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");

    let forged = send(&app, get("/user", Some("auth_token=not-a-token"))).await;
    assert_eq!(location(&forged), "/user/login");
}

#[tokio::test]
async fn test_registration_signs_in_and_sets_locale() {
    let (app, state) = test_app().await;

    let body = "username=marie&email=Marie%40Example.com&password=password123&password_confirmation=password123&language=fr";
    let response = send(&app, post_form("/user/registration", body, None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("auth_token=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("_locale=fr;")));

    let user = state.user_service.authenticate("marie", "password123").await.unwrap();
    assert_eq!(user.email, "marie@example.com");
    assert_eq!(user.language, "fr");

    // The cookie alone is enough to reach the account page
    let session = cookies
        .iter()
        .find(|c| c.starts_with("auth_token="))
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_string();
    let account = send(&app, get("/user", Some(&session))).await;
    assert_eq!(account.status(), StatusCode::OK);
    assert!(body_text(account).await.contains("marie@example.com"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_registrations_redisplay_the_form() {
    let (app, state) = test_app().await;
    let body = "username=marie&email=marie%40example.com&password=password123&password_confirmation=password123&language=fr";

    let submissions: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { send(&app, post_form("/user/registration", body, None)).await.status() })
        })
        .collect();
    let mut statuses = Vec::new();
    for submission in submissions {
        statuses.push(submission.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::SEE_OTHER).count(), 1, "{:?}", statuses);
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::SEE_OTHER || *s == StatusCode::UNPROCESSABLE_ENTITY),
        "{:?}",
        statuses
    );
    assert_eq!(state.user_service.search("marie").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_registration_is_redisplayed() {
    let (app, _) = test_app().await;

    let form = send(&app, get("/de/user/registration", None)).await;
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains(r#"<option value="de" selected>"#));

    let body = "username=x&email=nope&password=short&password_confirmation=other&language=fr";
    let response = send(&app, post_form("/user/registration", body, None)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Passwords do not match"));
    assert!(html.contains("Please enter a valid email address"));
}

#[tokio::test]
async fn test_login_failure_keeps_username() {
    let (app, state) = test_app().await;
    signed_in_user(&state, "marie").await;

    let response = send(&app, post_form("/user/login", "username=marie&password=wrong", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let html = body_text(response).await;
    assert!(html.contains("Invalid credentials."));
    assert!(html.contains(r#"value="marie""#));
}

#[tokio::test]
async fn test_login_and_logout() {
    let (app, state) = test_app().await;
    signed_in_user(&state, "marie").await;

    let response = send(
        &app,
        post_form("/fr/user/login", "username=marie&password=password123", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("auth_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("_locale=fr;")));

    let response = send(&app, get("/user/logout", None)).await;
    assert_eq!(location(&response), "/");
    assert!(set_cookies(&response).iter().any(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_profile_shows_approved_posts_and_last_comments() {
    let (app, state) = test_app().await;
    let (user, _) = signed_in_user(&state, "marie").await;

    let approved = state
        .post_service
        .create_post(NewPost {
            title: "Visible post".to_string(),
            content: "hello".to_string(),
            author_id: user.id,
            category_id: None,
            is_approved: true,
        })
        .await
        .unwrap();
    state
        .post_service
        .create_post(NewPost {
            title: "Hidden draft".to_string(),
            content: "secret".to_string(),
            author_id: user.id,
            category_id: None,
            is_approved: false,
        })
        .await
        .unwrap();
    for i in 1..=6 {
        state
            .comment_service
            .create_comment(NewComment {
                post_id: approved.id,
                author_id: user.id,
                content: format!("comment {}", i),
            })
            .await
            .unwrap();
    }

    let response = send(&app, get(&format!("/user/{}", user.id), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Visible post"));
    assert!(!html.contains("Hidden draft"));
    assert!(html.contains("comment 6"));
    assert!(!html.contains("comment 1<"));

    assert_eq!(send(&app, get("/user/999", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unapproved_posts_are_shown_to_their_author_only() {
    let (app, state) = test_app().await;
    let (author, author_cookie) = signed_in_user(&state, "marie").await;
    let (_, other_cookie) = signed_in_user(&state, "paul").await;

    for (title, approved) in [("Published", true), ("Draft", false)] {
        state
            .post_service
            .create_post(NewPost {
                title: title.to_string(),
                content: "text".to_string(),
                author_id: author.id,
                category_id: None,
                is_approved: approved,
            })
            .await
            .unwrap();
    }

    let url = format!("/user/{}/posts/1", author.id);
    let own = body_text(send(&app, get(&url, Some(&author_cookie))).await).await;
    assert!(own.contains("Draft"));
    assert!(own.contains("awaiting approval"));

    let other = body_text(send(&app, get(&url, Some(&other_cookie))).await).await;
    assert!(other.contains("Published"));
    assert!(!other.contains("Draft"));

    let anonymous = body_text(send(&app, get(&url, None)).await).await;
    assert!(!anonymous.contains("Draft"));

    let zero = send(&app, get(&format!("{}?page=0", url), None)).await;
    assert_eq!(zero.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posts_query_page_overrides_path() {
    let (app, state) = test_app().await;
    let (author, _) = signed_in_user(&state, "marie").await;
    for i in 1..=5 {
        state
            .post_service
            .create_post(NewPost {
                title: format!("Entry {}", i),
                content: "text".to_string(),
                author_id: author.id,
                category_id: None,
                is_approved: true,
            })
            .await
            .unwrap();
    }

    let html = body_text(send(&app, get(&format!("/user/{}/posts/1?page=2", author.id), None)).await).await;
    assert!(html.contains("Entry 1"));
    assert!(!html.contains("Entry 5"));
    assert!(html.contains("Page 2 of 2"));
}

#[tokio::test]
async fn test_search_users() {
    let (app, state) = test_app().await;
    signed_in_user(&state, "marie").await;
    signed_in_user(&state, "paul").await;
    state.post_service.create_category("Languages").await.unwrap();

    let empty = send(&app, get("/search/user", None)).await;
    assert_eq!(empty.status(), StatusCode::OK);
    assert!(body_text(empty).await.contains("Languages"));

    let response = send(&app, post_form("/search/user", "query=MAR", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(">marie</a>"));
    assert!(!html.contains(">paul</a>"));
    assert!(html.contains("Languages"));

    let short = send(&app, get("/search/user?query=m", None)).await;
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(short).await.contains("Search term must be between 2 and 50 characters"));
}

#[tokio::test]
async fn test_edit_profile() {
    let (app, state) = test_app().await;
    let (user, cookie) = signed_in_user(&state, "marie").await;
    signed_in_user(&state, "paul").await;

    let anonymous = send(&app, get("/user/edit", None)).await;
    assert_eq!(location(&anonymous), "/user/login");

    let form = body_text(send(&app, get("/user/edit", Some(&cookie))).await).await;
    assert!(form.contains(r#"value="marie@example.com""#));

    let taken = send(
        &app,
        post_form("/user/edit", "username=paul&email=marie%40example.com&language=en", Some(&cookie)),
    )
    .await;
    assert_eq!(taken.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(taken).await.contains("This username is already taken"));

    let response = send(
        &app,
        post_form(
            "/user/edit",
            "username=marie_c&email=marie%40example.com&language=de",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/user/{}", user.id));

    let updated = state.user_service.find_user(user.id).await.unwrap();
    assert_eq!(updated.username, "marie_c");
    assert_eq!(updated.language, "de");
}
