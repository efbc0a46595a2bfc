// SPDX-License-Identifier: MIT

//! Task route tests against the in-memory store.

use axum::http::StatusCode;
use housekeeping_api::config::{Config, Environment};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, create_test_app_with_config, mint_token, request};

async fn create(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(request("POST", "/api/tasks", Some(token), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn test_create_task_stamps_creator_and_defaults() {
    let (app, _, store) = create_test_app();
    let token = mint_token("u1", None);

    let task = create(
        &app,
        &token,
        json!({"title": "Clean room 101", "description": "Full turnover"}),
    )
    .await;

    assert_eq!(task["createdBy"], "u1");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["tags"], json!([]));
    assert_eq!(task["createdAt"], task["updatedAt"]);
    assert!(!task["id"].as_str().unwrap().is_empty());
    assert_eq!(store.len("tasks"), 1);
}

#[tokio::test]
async fn test_create_task_reports_all_violations() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&mint_token("u1", None)),
            Some(json!({"title": "", "description": " ", "priority": "urgent"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&json!("Title is required")));
    assert!(errors.contains(&json!("Description is required")));
    assert!(store.is_empty("tasks"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/tasks")
                .header("Authorization", format!("Bearer {}", mint_token("u1", None)))
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn test_get_update_and_delete_round_trip() {
    let (app, _, _) = create_test_app();
    let token = mint_token("u1", None);

    let task = create(
        &app,
        &token,
        json!({"title": "Restock", "description": "Towels", "tags": ["linen"]}),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"priority": "high", "assignedTo": "u2", "createdBy": "intruder"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["assignedTo"], "u2");
    assert_eq!(updated["createdBy"], "u1");
    assert_eq!(updated["title"], "Restock");
    assert_eq!(updated["tags"], json!(["linen"]));

    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Task deleted successfully"
    );

    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Task not found");

    let response = app
        .oneshot(request("DELETE", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _, _) = create_test_app();
    let token = mint_token("u1", None);

    let task = create(&app, &token, json!({"title": "t", "description": "d"})).await;
    let uri = format!("/api/tasks/{}/status", task["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(request("PATCH", &uri, Some(&token), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["errors"],
        json!(["Status is required"])
    );

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({"status": "blocked"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({"status": "in-progress"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "in-progress");
}

#[tokio::test]
async fn test_list_filters_and_assignee_route() {
    let (app, _, _) = create_test_app();
    let token = mint_token("u1", None);

    create(
        &app,
        &token,
        json!({"title": "a", "description": "d", "status": "done", "assignedTo": "u2"}),
    )
    .await;
    create(
        &app,
        &token,
        json!({"title": "b", "description": "d", "status": "todo", "assignedTo": "u2"}),
    )
    .await;
    create(
        &app,
        &token,
        json!({"title": "c", "description": "d", "status": "done", "priority": "high"}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/tasks?status=done", Some(&token), None))
        .await
        .unwrap();
    let done = body_json(response).await["data"].clone();
    let mut titles: Vec<_> = done
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["a", "c"]);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/tasks?status=done&assignedTo=u2",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/tasks/user/u2", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(request("GET", "/api/tasks?priority=urgent", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_filters_list_everything() {
    let (app, _, _) = create_test_app();
    let token = mint_token("u1", None);

    create(
        &app,
        &token,
        json!({"title": "a", "description": "d", "assignedTo": "u2"}),
    )
    .await;
    create(&app, &token, json!({"title": "b", "description": "d"})).await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/tasks?status=&assignedTo=&priority=",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_development_errors_carry_stack() {
    let mut config = Config::test_default();
    config.environment = Environment::Development;
    let (app, _, _) = create_test_app_with_config(config);

    let response = app
        .oneshot(request(
            "GET",
            "/api/tasks/missing",
            Some(&mint_token("u1", None)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Task not found");
    assert!(body["stack"].as_str().unwrap().contains("NotFound"));
}

#[tokio::test]
async fn test_non_development_errors_hide_stack() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/tasks/missing",
            Some(&mint_token("u1", None)),
            None,
        ))
        .await
        .unwrap();

    assert!(body_json(response).await.get("stack").is_none());
}
