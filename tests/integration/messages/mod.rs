//! Chat and message ledger endpoint tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::common::{authed_request, json_request, parse_body, TestApp};

async fn chat(app: &TestApp, token: &str, content: &str) -> Value {
    let resp = app
        .send(json_request(
            Method::POST,
            "/chat",
            Some(token),
            json!({"content": content}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    parse_body(resp).await
}

async fn list(app: &TestApp, token: &str) -> Vec<Value> {
    let resp = app.send(authed_request(Method::GET, "/messages", token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    parse_body(resp).await.as_array().unwrap().clone()
}

fn contents(messages: &[Value]) -> Vec<&str> {
    messages
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect()
}

mod test_chat {
    use super::*;

    #[tokio::test]
    async fn test_chat_returns_assistant_message() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;

        let body = chat(&app, &token, "hello").await;
        assert_eq!(body["content"], "Mock response to: hello");
        assert_eq!(body["is_user_message"], false);
        assert!(body["id"].is_i64());
        assert!(body["created_at"].is_string());
        assert!(body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_chat_requires_auth() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(
                Method::POST,
                "/chat",
                None,
                json!({"content": "hello"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(app.llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_blank_content_400() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;

        for content in ["", "   "] {
            let resp = app
                .send(json_request(
                    Method::POST,
                    "/chat",
                    Some(&token),
                    json!({"content": content}),
                ))
                .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert!(app.store.all_messages().is_empty());
    }

    #[tokio::test]
    async fn test_chat_gateway_failure_500_keeps_user_message() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        app.llm.push_failure("insufficient_quota");

        let resp = app
            .send(json_request(
                Method::POST,
                "/chat",
                Some(&token),
                json!({"content": "hello"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("insufficient_quota"));

        let listed = list(&app, &token).await;
        assert_eq!(contents(&listed), vec!["hello"]);
        assert_eq!(listed[0]["is_user_message"], true);
    }
}

mod test_list_messages {
    use super::*;

    #[tokio::test]
    async fn test_list_without_conversation_is_empty() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;

        assert!(list(&app, &token).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_after_send_has_user_then_assistant() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;

        let reply = chat(&app, &token, "hello").await;
        let listed = list(&app, &token).await;

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["content"], "hello");
        assert_eq!(listed[0]["is_user_message"], true);
        assert_eq!(listed[1]["id"], reply["id"]);
        assert_eq!(listed[1]["is_user_message"], false);
    }

    #[tokio::test]
    async fn test_users_see_only_their_own_messages() {
        let app = TestApp::new();
        let alice = app.register_and_login("alice").await;
        let bob = app.register_and_login("bob").await;

        chat(&app, &alice, "from alice").await;

        assert!(list(&app, &bob).await.is_empty());
        assert_eq!(list(&app, &alice).await.len(), 2);
    }
}

mod test_update_message {
    use super::*;

    #[tokio::test]
    async fn test_edit_regenerates_paired_reply_in_place() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        app.llm.push_response("first answer");
        app.llm.push_response("second answer");
        chat(&app, &token, "first").await;
        chat(&app, &token, "second").await;

        let before = list(&app, &token).await;
        let first_id = before[0]["id"].as_i64().unwrap();

        app.llm.push_response("first answer, again");
        let resp = app
            .send(json_request(
                Method::PUT,
                &format!("/messages/{}", first_id),
                Some(&token),
                json!({"content": "first, edited"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], before[0]["id"]);
        assert_eq!(items[0]["content"], "first, edited");
        assert_eq!(items[1]["id"], before[1]["id"]);
        assert_eq!(items[1]["content"], "first answer, again");

        let after = list(&app, &token).await;
        assert_eq!(
            contents(&after),
            vec!["first, edited", "first answer, again", "second", "second answer"]
        );
        assert_eq!(after[3]["updated_at"], before[3]["updated_at"]);
    }

    #[tokio::test]
    async fn test_edit_without_reply_returns_single_item() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        app.llm.push_failure("down");
        app.send(json_request(
            Method::POST,
            "/chat",
            Some(&token),
            json!({"content": "unanswered"}),
        ))
        .await;
        let id = list(&app, &token).await[0]["id"].as_i64().unwrap();
        app.llm.reset();

        let resp = app
            .send(json_request(
                Method::PUT,
                &format!("/messages/{}", id),
                Some(&token),
                json!({"content": "still unanswered"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert!(app.llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_edit_assistant_message_400() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        let reply = chat(&app, &token, "hello").await;

        let resp = app
            .send(json_request(
                Method::PUT,
                &format!("/messages/{}", reply["id"]),
                Some(&token),
                json!({"content": "rewritten"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(resp).await["error"]["code"], "INVALID_OPERATION");
    }

    #[tokio::test]
    async fn test_edit_other_users_message_404() {
        let app = TestApp::new();
        let alice = app.register_and_login("alice").await;
        let bob = app.register_and_login("bob").await;
        chat(&app, &alice, "private").await;
        let id = list(&app, &alice).await[0]["id"].as_i64().unwrap();

        let resp = app
            .send(json_request(
                Method::PUT,
                &format!("/messages/{}", id),
                Some(&bob),
                json!({"content": "mine now"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(list(&app, &alice).await[0]["content"], "private");
    }

    #[tokio::test]
    async fn test_edit_gateway_failure_500_keeps_edit() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        app.llm.push_response("old answer");
        chat(&app, &token, "question").await;
        let id = list(&app, &token).await[0]["id"].as_i64().unwrap();

        app.llm.push_failure("timeout");
        let resp = app
            .send(json_request(
                Method::PUT,
                &format!("/messages/{}", id),
                Some(&token),
                json!({"content": "better question"}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            contents(&list(&app, &token).await),
            vec!["better question", "old answer"]
        );
    }
}

mod test_delete_message {
    use super::*;

    #[tokio::test]
    async fn test_delete_hides_message_but_keeps_reply() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        app.llm.push_response("answer");
        chat(&app, &token, "regrettable").await;
        let id = list(&app, &token).await[0]["id"].as_i64().unwrap();

        let resp = app
            .send(authed_request(
                Method::DELETE,
                &format!("/messages/{}", id),
                &token,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await, json!({"detail": "Message deleted"}));

        assert_eq!(contents(&list(&app, &token).await), vec!["answer"]);

        let stored = app.store.all_messages();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].is_deleted);

        chat(&app, &token, "next").await;
        let prompt = app.llm.last_request().unwrap().messages;
        assert!(prompt.iter().all(|turn| turn.content != "regrettable"));
    }

    #[tokio::test]
    async fn test_delete_assistant_message_400() {
        let app = TestApp::new();
        let token = app.register_and_login("alice").await;
        let reply = chat(&app, &token, "hello").await;

        let resp = app
            .send(authed_request(
                Method::DELETE,
                &format!("/messages/{}", reply["id"]),
                &token,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(list(&app, &token).await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_or_foreign_message_404() {
        let app = TestApp::new();
        let alice = app.register_and_login("alice").await;
        let bob = app.register_and_login("bob").await;
        chat(&app, &alice, "hello").await;
        let id = list(&app, &alice).await[0]["id"].as_i64().unwrap();

        let resp = app
            .send(authed_request(
                Method::DELETE,
                &format!("/messages/{}", id),
                &bob,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .send(authed_request(Method::DELETE, "/messages/424242", &alice))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
