mod common;

use common::{
    docx_with_lines, pptx_with_slides, spawn_app, spawn_app_with_limit, ScriptedProvider,
};
use docchat::models::{Role, Session};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn send_text(app: &common::TestApp, body: Value) -> (StatusCode, Value) {
    let response = app
        .client
        .post(app.url("/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn send_form(app: &common::TestApp, form: Form) -> (StatusCode, Value) {
    let response = app
        .client
        .post(app.url("/api/chat"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get_session(app: &common::TestApp, id: &str) -> Session {
    app.client
        .get(app.url(&format!("/api/chats/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn list_sessions(app: &common::TestApp) -> Vec<Value> {
    let body: Value = app
        .client
        .get(app.url("/api/chats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["sessions"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_chat_creates_session_with_exchange() {
    let app = spawn_app(ScriptedProvider::replying("Hi there")).await;

    let (status, body) = send_text(&app, json!({"message": "Hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Hi there");
    let chat_id = body["chat_id"].as_str().unwrap().to_string();

    let session = get_session(&app, &chat_id).await;
    assert_eq!(session.id, chat_id);
    assert_eq!(session.title, "Hello...");
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].role, Role::User);
    assert_eq!(session.messages[0].message.as_deref(), Some("Hello"));
    assert_eq!(session.messages[1].role, Role::Assistant);
    assert_eq!(session.messages[1].reply.as_deref(), Some("Hi there"));
    assert_eq!(session.messages[0].time, session.messages[1].time);

    let prompts = app.provider.prompts();
    assert!(prompts[0].starts_with("You are a helpful assistant."));
    assert!(prompts[0].ends_with("\n\nHello"));
}

#[tokio::test]
async fn test_chat_continues_session() {
    let app = spawn_app(ScriptedProvider::replying("ok")).await;

    let (_, first) = send_text(&app, json!({"message": "one"})).await;
    let chat_id = first["chat_id"].as_str().unwrap();
    let (status, second) = send_text(&app, json!({"message": "two", "chat_id": chat_id})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["chat_id"], chat_id);
    assert_eq!(get_session(&app, chat_id).await.messages.len(), 4);
    assert_eq!(list_sessions(&app).await.len(), 1);
}

#[tokio::test]
async fn test_chat_without_input_is_rejected() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let (status, body) = send_text(&app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reply"], "⚠️ No input or file received.");

    let (status, _) = send_form(&app, Form::new().text("message", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(list_sessions(&app).await.is_empty());
    assert!(app.provider.prompts().is_empty());
}

#[tokio::test]
async fn test_chat_model_failure() {
    let app = spawn_app(ScriptedProvider::failing()).await;

    let (status, body) = send_text(&app, json!({"message": "Hello"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reply"], "⚠️ Error processing your message.");
    assert!(body.get("chat_id").is_none());
    assert!(list_sessions(&app).await.is_empty());
}

#[tokio::test]
async fn test_multipart_text_only() {
    let app = spawn_app(ScriptedProvider::replying("Hi")).await;

    let (status, body) = send_form(&app, Form::new().text("message", "Hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Hi");
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_multipart_resume_upload_and_download() {
    let app = spawn_app(ScriptedProvider::replying("Score: 85")).await;
    let resume = docx_with_lines(&["Jane Doe", "Skills: Rust"]);

    let form = Form::new().part(
        "file",
        Part::bytes(resume.clone()).file_name("resume.docx"),
    );
    let (status, body) = send_form(&app, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Score: 85");

    let session = get_session(&app, body["chat_id"].as_str().unwrap()).await;
    let user = &session.messages[0];
    let stored = user.file.as_ref().unwrap().name.clone();
    assert!(stored.ends_with("_resume.docx"));
    assert_eq!(
        user.message.as_deref(),
        Some(format!("\n\nFile Content ({}): Jane Doe\nSkills: Rust", stored).as_str())
    );
    assert!(app.provider.prompts()[0].starts_with("You are an expert ATS analyzer."));

    let response = app
        .client
        .get(app.url(&format!("/download/{}", stored)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert_eq!(disposition, format!("attachment; filename=\"{}\"", stored));
    assert_eq!(response.bytes().await.unwrap().to_vec(), resume);
}

#[tokio::test]
async fn test_unsupported_upload_is_rejected() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let form = Form::new()
        .text("message", "run this")
        .part("file", Part::bytes(b"MZ".to_vec()).file_name("setup.exe"));
    let (status, body) = send_form(&app, form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reply"], "⚠️ Unsupported file type.");
    assert!(list_sessions(&app).await.is_empty());
    assert!(app.provider.prompts().is_empty());
    assert_eq!(app.stored_files(), 1);
}

#[tokio::test]
async fn test_download_missing_file() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let response = app
        .client
        .get(app.url("/download/nothing.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "File not found");

    let response = app
        .client
        .get(app.url("/download/..%2F..%2Fetc%2Fpasswd"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rename_delete_session() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let body: Value = app
        .client
        .post(app.url("/api/chats"))
        .json(&json!({"message": "Plan my week\nwith details"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let chat_id = body["chat_id"].as_str().unwrap().to_string();

    let session = get_session(&app, &chat_id).await;
    assert_eq!(session.title, "Plan my week");
    assert!(session.messages.is_empty());

    let response = app
        .client
        .patch(app.url(&format!("/api/chats/{}", chat_id)))
        .json(&json!({"title": "Weekly plan"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Title updated successfully");
    assert_eq!(body["title"], "Weekly plan");
    assert_eq!(get_session(&app, &chat_id).await.title, "Weekly plan");

    let response = app
        .client
        .patch(app.url(&format!("/api/chats/{}", chat_id)))
        .json(&json!({"title": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Title is required");

    let response = app
        .client
        .delete(app.url(&format!("/api/chats/{}", chat_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Chat deleted successfully");

    let response = app
        .client
        .get(app.url(&format!("/api/chats/{}", chat_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Chat session not found");
}

#[tokio::test]
async fn test_unknown_session_operations() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let response = app
        .client
        .patch(app.url("/api/chats/missing"))
        .json(&json!({"title": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url("/api/chats/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url("/api/chats/missing/message/m1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Chat or message not found");
}

#[tokio::test]
async fn test_delete_message() {
    let app = spawn_app(ScriptedProvider::replying("Hi")).await;

    let (_, body) = send_text(&app, json!({"message": "Hello"})).await;
    let chat_id = body["chat_id"].as_str().unwrap().to_string();
    let session = get_session(&app, &chat_id).await;
    let user_message_id = session.messages[0].id.clone();

    let response = app
        .client
        .delete(app.url(&format!(
            "/api/chats/{}/message/{}",
            chat_id, user_message_id
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Message deleted successfully");

    let session = get_session(&app, &chat_id).await;
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, Role::Assistant);
}

#[tokio::test]
async fn test_search_and_clear() {
    let app = spawn_app(ScriptedProvider::replying("Hi")).await;

    send_text(&app, json!({"message": "Rust ownership question"})).await;
    send_text(&app, json!({"message": "Weekend recipes"})).await;

    let body: Value = app
        .client
        .get(app.url("/api/chats/search?q=OWNERSHIP"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Rust ownership quest...");
    assert!(results[0]["_id"].is_string());

    let body: Value = app
        .client
        .get(app.url("/api/chats/search?q=nothing-matches"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["results"].as_array().unwrap().is_empty());

    let response = app
        .client
        .delete(app.url("/api/chats"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "All chats deleted successfully");
    assert!(list_sessions(&app).await.is_empty());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let response = app.client.get(app.url("/api/nope")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_percent_encoded_filename() {
    let app = spawn_app(ScriptedProvider::replying("Looks good")).await;
    let resume = docx_with_lines(&["Jane Doe"]);

    let form = Form::new().part(
        "file",
        Part::bytes(resume.clone()).file_name("My Resume.docx"),
    );
    let (status, body) = send_form(&app, form).await;
    assert_eq!(status, StatusCode::OK);

    let session = get_session(&app, body["chat_id"].as_str().unwrap()).await;
    let stored = session.messages[0].file.as_ref().unwrap().name.clone();
    assert!(stored.ends_with("_My Resume.docx"));

    let response = app
        .client
        .get(app.url(&format!("/download/{}", urlencoding::encode(&stored))))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().to_vec(), resume);
}

#[tokio::test]
async fn test_session_id_with_reserved_characters() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let body: Value = app
        .client
        .post(app.url("/api/chats"))
        .json(&json!({"chat_id": "my chat", "title": "Notes"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["chat_id"], "my chat");

    let session = get_session(&app, "my%20chat").await;
    assert_eq!(session.id, "my chat");
    assert_eq!(session.title, "Notes");

    let response = app
        .client
        .patch(app.url("/api/chats/my%20chat"))
        .json(&json!({"title": "Renamed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .delete(app.url("/api/chats/my%20chat"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(list_sessions(&app).await.is_empty());
}

#[tokio::test]
async fn test_oversized_bodies_are_rejected() {
    let app = spawn_app_with_limit(ScriptedProvider::replying("unused"), 1024).await;

    let form = Form::new()
        .text("message", "see attached")
        .part("file", Part::bytes(vec![b'x'; 4096]).file_name("big.pdf"));
    let response = app
        .client
        .post(app.url("/api/chat"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Payload too large");

    let (status, _) = send_text(&app, json!({"message": "y".repeat(4096)})).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    assert!(list_sessions(&app).await.is_empty());
    assert!(app.provider.prompts().is_empty());
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_multipart_pptx_upload() {
    let app = spawn_app(ScriptedProvider::replying("A roadmap deck")).await;
    let deck = pptx_with_slides(&["Quarterly Review", "Roadmap"]);

    let form = Form::new()
        .text("message", "What is this deck about?")
        .part("file", Part::bytes(deck).file_name("deck.pptx"));
    let (status, body) = send_form(&app, form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "A roadmap deck");

    let session = get_session(&app, body["chat_id"].as_str().unwrap()).await;
    let user = &session.messages[0];
    let stored = user.file.as_ref().unwrap().name.clone();
    assert!(stored.ends_with("_deck.pptx"));
    assert_eq!(
        user.message.as_deref(),
        Some(
            format!(
                "What is this deck about?\n\nFile Content ({}): Quarterly Review\nRoadmap\n",
                stored
            )
            .as_str()
        )
    );
    assert!(app.provider.prompts()[0].starts_with("You are a helpful assistant."));
}

#[tokio::test]
async fn test_corrupt_pdf_upload() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"%PDF-garbage".to_vec()).file_name("broken.pdf"),
    );
    let (status, body) = send_form(&app, form).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reply"], "⚠️ Error processing your message.");
    assert!(list_sessions(&app).await.is_empty());
    assert!(app.provider.prompts().is_empty());
}

#[tokio::test]
async fn test_chat_null_message() {
    let app = spawn_app(ScriptedProvider::replying("unused")).await;

    let (status, body) = send_text(&app, json!({"message": null, "chat_id": null})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reply"], "⚠️ No input or file received.");
}
