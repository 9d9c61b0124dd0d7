//! HTTP-level tests for request dispatch
//!
//! Each request goes through the full stack:
//! HTTP request → router → handler → DataSource → codec → HTTP response.

mod common;

use axum::http::header::{ALLOW, CONTENT_TYPE, LOCATION};
use axum::http::{Method, StatusCode};
use common::{Call, Post, harness};
use restful::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// List
// =============================================================================

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_collection_returns_empty_list() {
        let h = harness();

        let response = h.server.get("/v1/posts").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = response.json();
        assert_eq!(body, json!({ "data": [] }));
    }

    #[tokio::test]
    async fn test_list_encodes_wire_keys() {
        let h = harness();
        let mut post = Post::new("Hello");
        post.view_count = 7;
        h.source.seed(post).await;
        h.source.seed(Post::new("World")).await;

        let response = h.server.get("/v1/posts").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], "1");
        assert_eq!(data[0]["title"], "Hello");
        assert_eq!(data[0]["viewCount"], 7);
        assert!(data[0].get("view_count").is_none());
        assert_eq!(data[1]["title"], "World");
    }

    #[tokio::test]
    async fn test_query_parameters_reach_the_source() {
        let h = harness();

        h.server
            .get("/v1/posts?tag=rust,axum&tag=web&sort=title")
            .await
            .assert_status(StatusCode::OK);

        let calls = h.source.calls();
        let Call::FindAll(params) = &calls[0] else {
            panic!("expected a find_all call, got {:?}", calls);
        };
        assert_eq!(params["tag"], vec!["rust", "axum", "web"]);
        assert_eq!(params["sort"], vec!["title"]);
    }
}

// =============================================================================
// Read
// =============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_single_record() {
        let h = harness();
        let id = h.source.seed(Post::new("Hello")).await;

        let response = h.server.get(&format!("/v1/posts/{}", id)).await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["title"], "Hello");
        assert_eq!(h.source.calls(), vec![Call::FindOne(id)]);
    }

    #[tokio::test]
    async fn test_read_comma_separated_ids_uses_find_multiple() {
        let h = harness();
        for title in ["one", "two", "three"] {
            h.source.seed(Post::new(title)).await;
        }

        let response = h.server.get("/v1/posts/3,1").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let titles: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["three", "one"]);
        assert_eq!(
            h.source.calls(),
            vec![Call::FindMultiple(vec!["3".to_string(), "1".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_read_unknown_id_returns_404() {
        let h = harness();

        let response = h.server.get("/v1/posts/42").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("post with id '42' not found"));
    }

    #[tokio::test]
    async fn test_empty_id_in_list_returns_400() {
        let h = harness();

        let response = h.server.get("/v1/posts/1,,2").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(h.source.calls().is_empty());
    }
}

// =============================================================================
// Create
// =============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_201_with_location() {
        let h = harness();

        let response = h
            .server
            .post("/v1/posts")
            .json(&json!({ "data": { "title": "Hello", "viewCount": 3, "tags": ["intro"] } }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/v1/posts/1");

        let body: Value = response.json();
        assert_eq!(body["data"]["id"], "1");
        assert_eq!(body["data"]["title"], "Hello");
        assert_eq!(body["data"]["viewCount"], 3);
        assert_eq!(body["data"]["tags"], json!(["intro"]));

        let stored = h.source.get("1").await.unwrap();
        assert_eq!(stored.view_count, 3);
    }

    #[tokio::test]
    async fn test_create_accepts_bare_and_named_envelopes() {
        let h = harness();

        h.server
            .post("/v1/posts")
            .json(&json!({ "title": "bare" }))
            .await
            .assert_status(StatusCode::CREATED);
        h.server
            .post("/v1/posts")
            .json(&json!({ "posts": { "title": "named" } }))
            .await
            .assert_status(StatusCode::CREATED);

        assert_eq!(h.source.get("1").await.unwrap().title, "bare");
        assert_eq!(h.source.get("2").await.unwrap().title, "named");
    }

    #[tokio::test]
    async fn test_create_with_several_objects_returns_400() {
        let h = harness();

        let response = h
            .server
            .post("/v1/posts")
            .json(&json!({ "data": [{ "title": "a" }, { "title": "b" }] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("expected exactly one object, got 2"));
        assert!(h.source.calls().is_empty());
        assert_eq!(h.source.len(), 0);
    }

    #[tokio::test]
    async fn test_create_with_malformed_json_returns_400() {
        let h = harness();

        let response = h.server.post("/v1/posts").text("{ not json").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Invalid JSON body"));
        assert!(h.source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_wrong_field_type_names_the_field() {
        let h = harness();

        let response = h
            .server
            .post("/v1/posts")
            .json(&json!({ "data": { "title": "Hello", "viewCount": "many" } }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        let error = &body["errors"][0];
        assert_eq!(error["status"], "400");
        assert_eq!(error["code"], "INVALID_FIELD");
        assert_eq!(error["source"]["pointer"], "/viewCount");
        assert!(error["detail"].as_str().unwrap().contains("viewCount"));
        assert_eq!(h.source.len(), 0);
    }
}

// =============================================================================
// Update
// =============================================================================

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() {
        let h = harness();
        let mut post = Post::new("Hello");
        post.view_count = 10;
        let id = h.source.seed(post).await;

        let response = h
            .server
            .put(&format!("/v1/posts/{}", id))
            .json(&json!({ "data": { "title": "Hello again" } }))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.as_bytes().is_empty());

        let stored = h.source.get(&id).await.unwrap();
        assert_eq!(stored.title, "Hello again");
        assert_eq!(stored.body, "Hello body");
        assert_eq!(stored.view_count, 10);
        assert_eq!(
            h.source.calls(),
            vec![Call::FindOne(id.clone()), Call::Update(stored)]
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_404() {
        let h = harness();

        let response = h
            .server
            .put("/v1/posts/9")
            .json(&json!({ "title": "ghost" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(h.source.calls(), vec![Call::FindOne("9".to_string())]);
    }

    #[tokio::test]
    async fn test_update_with_other_id_in_body_returns_409() {
        let h = harness();
        let first = h.source.seed(Post::new("one")).await;
        let second = h.source.seed(Post::new("two")).await;

        let response = h
            .server
            .put(&format!("/v1/posts/{}", first))
            .json(&json!({ "data": { "id": second, "title": "hijacked" } }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(h.source.get(&first).await.unwrap().title, "one");
        assert_eq!(h.source.get(&second).await.unwrap().title, "two");
        assert_eq!(h.source.calls(), vec![Call::FindOne(first)]);
    }

    #[tokio::test]
    async fn test_update_with_same_id_in_body_is_accepted() {
        let h = harness();
        let id = h.source.seed(Post::new("one")).await;

        h.server
            .put(&format!("/v1/posts/{}", id))
            .json(&json!({ "id": id, "title": "renamed" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(h.source.get(&id).await.unwrap().title, "renamed");
    }

    #[tokio::test]
    async fn test_update_with_wrong_field_type_leaves_record_untouched() {
        let h = harness();
        let id = h.source.seed(Post::new("Hello")).await;

        let response = h
            .server
            .put(&format!("/v1/posts/{}", id))
            .json(&json!({ "title": "changed", "tags": "not-a-list" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(h.source.get(&id).await.unwrap().title, "Hello");
    }
}

// =============================================================================
// Delete
// =============================================================================

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_returns_204() {
        let h = harness();
        let id = h.source.seed(Post::new("Hello")).await;

        let response = h.server.delete(&format!("/v1/posts/{}", id)).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(h.source.len(), 0);

        h.server
            .get(&format!("/v1/posts/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_returns_404() {
        let h = harness();

        h.server
            .delete("/v1/posts/5")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

mod options_tests {
    use super::*;

    #[tokio::test]
    async fn test_collection_options() {
        let h = harness();

        let response = h.server.method(Method::OPTIONS, "/v1/posts").await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ALLOW], "GET,POST,OPTIONS");
        assert!(h.source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_item_options() {
        let h = harness();

        let response = h.server.method(Method::OPTIONS, "/v1/posts/1").await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ALLOW], "GET,PUT,DELETE,OPTIONS");
        assert!(h.source.calls().is_empty());
    }
}

// =============================================================================
// Data source failures
// =============================================================================

mod source_failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_unclassified_error_returns_empty_500() {
        let h = harness();
        h.source
            .fail_next(anyhow::anyhow!("connection reset by database"));

        let response = h.server.get("/v1/posts").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_http_error_keeps_status_and_message() {
        let h = harness();
        h.source
            .fail_next(HttpError::conflict("title already taken"));

        let response = h
            .server
            .post("/v1/posts")
            .json(&json!({ "title": "Hello" }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.text(), "title already taken");
    }

    #[tokio::test]
    async fn test_structured_errors_are_sent_as_document() {
        let h = harness();
        h.source.fail_next(
            HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid post").with_errors([
                ErrorObject::new("Title too short")
                    .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                    .with_pointer("/title"),
                ErrorObject::new("Body required").with_code("BODY_REQUIRED"),
            ]),
        );

        let response = h.server.get("/v1/posts/1").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({
                "errors": [
                    { "status": "422", "title": "Title too short", "source": { "pointer": "/title" } },
                    { "code": "BODY_REQUIRED", "title": "Body required" }
                ]
            })
        );
    }
}
