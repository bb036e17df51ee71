mod common;

use axum::http::StatusCode;
use common::*;
use wordbook_app::models::WordInput;

#[tokio::test]
async fn test_empty_index_renders() {
    let (app, _) = test_app().await;

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No words here."));
    assert!(html.contains("Page 1 of 1"));
}

#[tokio::test]
async fn test_index_pages_and_invalid_page_numbers() {
    let (app, state) = test_app().await;
    for i in 1..=6 {
        state
            .word_service
            .create(&WordInput::normalized(&format!("word{}", i), None, &[]))
            .await
            .unwrap();
    }

    let second = body_text(send(&app, get("/2", None)).await).await;
    assert!(second.contains("word6"));
    assert!(!second.contains(">word1<"));

    let past_end = send(&app, get("/7", None)).await;
    assert_eq!(past_end.status(), StatusCode::OK);

    assert_eq!(send(&app, get("/0", None)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/abc", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_locale_prefix_routes_to_index() {
    let (app, _) = test_app().await;

    let response = send(&app, get("/fr/1", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"<html lang="fr">"#));
}

#[tokio::test]
async fn test_error_pages_follow_the_locale() {
    let (app, _) = test_app().await;

    let prefixed = send(&app, get("/fr/word/999", None)).await;
    assert_eq!(prefixed.status(), StatusCode::NOT_FOUND);
    let html = body_text(prefixed).await;
    assert!(html.contains(r#"<html lang="fr">"#));
    assert!(html.contains("Word 999 not found"));

    let from_cookie = send(&app, get("/no/such/page", Some("_locale=de"))).await;
    assert_eq!(from_cookie.status(), StatusCode::NOT_FOUND);
    assert!(body_text(from_cookie).await.contains(r#"<html lang="de">"#));

    let default = send(&app, get("/word/999", None)).await;
    assert!(body_text(default).await.contains(r#"<html lang="en">"#));
}

#[tokio::test]
async fn test_create_word_redirects_to_show() {
    let (app, state) = test_app().await;

    let form = send(&app, get("/word/new", None)).await;
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains("English"));

    let response = send(&app, post_form("/word/new", "name=house&language_id=1", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);

    let created = state.word_service.list_page(1).await.unwrap();
    assert_eq!(created.items.len(), 1);
    assert_eq!(target, format!("/word/{}", created.items[0].id));

    let show = body_text(send(&app, get(&target, None)).await).await;
    assert!(show.contains("house"));
    assert!(show.contains(r#"name="_method" value="DELETE""#));
}

#[tokio::test]
async fn test_invalid_word_is_redisplayed() {
    let (app, state) = test_app().await;

    let response = send(&app, post_form("/word/new", "name=+++&language_id=99", None)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Name must not be blank"));
    assert_eq!(state.word_service.list_page(1).await.unwrap().total_items, 0);
}

#[tokio::test]
async fn test_edit_word_persists_and_redirects_to_edit() {
    let (app, state) = test_app().await;
    let dog = state
        .word_service
        .create(&WordInput::normalized("dog", Some(1), &[]))
        .await
        .unwrap();
    let chien = state
        .word_service
        .create(&WordInput::normalized("chien", Some(2), &[]))
        .await
        .unwrap();
    let hund = state
        .word_service
        .create(&WordInput::normalized("Hund", Some(3), &[]))
        .await
        .unwrap();

    let edit_url = format!("/word/{}/edit", dog.id);
    let body = format!(
        "name=doggy&language_id=1&translations={}&translations={}",
        chien.id, hund.id
    );
    let response = send(&app, post_form(&edit_url, &body, None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), edit_url);

    let word = state.word_service.find_word(dog.id).await.unwrap();
    assert_eq!(word.name, "doggy");
    assert_eq!(word.translation_ids(), vec![chien.id, hund.id]);

    let page = body_text(send(&app, get(&edit_url, None)).await).await;
    assert!(page.contains(&format!(r#"<option value="{}" selected>chien</option>"#, chien.id)));
}

#[tokio::test]
async fn test_self_translation_is_rejected() {
    let (app, state) = test_app().await;
    let dog = state
        .word_service
        .create(&WordInput::normalized("dog", None, &[]))
        .await
        .unwrap();

    let body = format!("name=dog&translations={}", dog.id);
    let response = send(&app, post_form(&format!("/word/{}/edit", dog.id), &body, None)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("A word cannot be its own translation"));
    assert!(state.word_service.find_word(dog.id).await.unwrap().translations().is_empty());
}

#[tokio::test]
async fn test_delete_form_removes_word() {
    let (app, state) = test_app().await;
    let dog = state
        .word_service
        .create(&WordInput::normalized("dog", None, &[]))
        .await
        .unwrap();
    let chien = state
        .word_service
        .create(&WordInput::normalized("chien", None, &[dog.id]))
        .await
        .unwrap();

    let url = format!("/word/{}", dog.id);
    let response = send(&app, post_form(&url, "_method=DELETE", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    assert_eq!(send(&app, get(&url, None)).await.status(), StatusCode::NOT_FOUND);
    let chien = state.word_service.find_word(chien.id).await.unwrap();
    assert!(chien.translations().is_empty());
}

#[tokio::test]
async fn test_post_without_override_keeps_word() {
    let (app, state) = test_app().await;
    let dog = state
        .word_service
        .create(&WordInput::normalized("dog", None, &[]))
        .await
        .unwrap();

    let response = send(&app, post_form(&format!("/word/{}", dog.id), "", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.word_service.find_word(dog.id).await.is_ok());
}

#[tokio::test]
async fn test_http_delete_and_unknown_words() {
    let (app, state) = test_app().await;
    let dog = state
        .word_service
        .create(&WordInput::normalized("dog", None, &[]))
        .await
        .unwrap();

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/word/{}", dog.id))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.word_service.find_word(dog.id).await.is_err());

    assert_eq!(send(&app, get("/word/999", None)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/word/999/edit", None)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/word/dog", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app().await;

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
}
