// SPDX-License-Identifier: MIT

//! User directory route tests against the in-memory store.

use axum::http::StatusCode;
use housekeeping_api::db::{collections, DocumentStore};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, mint_token, request};

#[tokio::test]
async fn test_register_then_me() {
    let (app, _, _) = create_test_app();
    let token = mint_token("ana", None);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(&token),
            Some(json!({"displayName": "Ana"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["data"],
        json!({"uid": "ana", "email": "ana@example.com", "displayName": "Ana", "role": "staff"})
    );

    let response = app
        .oneshot(request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await["data"].clone();
    assert_eq!(profile["displayName"], "Ana");
    assert!(profile.get("createdAt").is_none());
}

#[tokio::test]
async fn test_me_without_profile_is_not_found() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(request(
            "GET",
            "/api/auth/me",
            Some(&mint_token("ghost", None)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "User profile not found"
    );
}

#[tokio::test]
async fn test_second_registration_conflicts() {
    let (app, _, _) = create_test_app();
    let token = mint_token("ana", None);
    let body = json!({"displayName": "Ana", "email": "ana@hotel.example"});

    let first = app
        .clone()
        .oneshot(request("POST", "/api/users", Some(&token), Some(body.clone())))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(request("POST", "/api/auth/register", Some(&token), Some(body)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(second).await["message"],
        "User profile already exists"
    );
}

#[tokio::test]
async fn test_verify_records_last_login() {
    let (app, _, store) = create_test_app();
    let token = mint_token("ana", None);

    app.clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(&token),
            Some(json!({"displayName": "Ana"})),
        ))
        .await
        .unwrap();

    let before = store.get(collections::USERS, "ana").await.unwrap().unwrap();
    assert!(before.get("lastLogin").is_none());

    let response = app
        .oneshot(request("POST", "/api/auth/verify", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = store.get(collections::USERS, "ana").await.unwrap().unwrap();
    assert!(after["lastLogin"].is_string());
}

#[tokio::test]
async fn test_verify_without_profile_still_succeeds() {
    let (app, _, store) = create_test_app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/verify",
            Some(&mint_token("newcomer", None)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.is_empty(collections::USERS));
}

#[tokio::test]
async fn test_update_self_and_forbidden_for_others() {
    let (app, _, _) = create_test_app();
    let ana = mint_token("ana", None);
    let bo = mint_token("bo", None);

    for (token, name) in [(&ana, "Ana"), (&bo, "Bo")] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/users",
                Some(token),
                Some(json!({"displayName": name})),
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/users/ana",
            Some(&ana),
            Some(json!({"displayName": "Ana M.", "photoURL": "https://img.example/ana.png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await["data"].clone();
    assert_eq!(profile["displayName"], "Ana M.");
    assert_eq!(profile["photoURL"], "https://img.example/ana.png");

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/users/ana",
            Some(&bo),
            Some(json!({"displayName": "Hacked"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = mint_token("root", Some("admin"));
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/users/bo",
            Some(&admin),
            Some(json!({"role": "manager"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "manager");

    let response = app
        .oneshot(request(
            "PUT",
            "/api/users/nobody",
            Some(&admin),
            Some(json!({"displayName": "X"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_lists_and_gets_profiles() {
    let (app, _, _) = create_test_app();

    for uid in ["a1", "a2"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/users",
                Some(&mint_token(uid, None)),
                Some(json!({"displayName": uid})),
            ))
            .await
            .unwrap();
    }

    let admin = mint_token("root", Some("admin"));
    let response = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/users/a2", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["uid"], "a2");

    let response = app
        .oneshot(request("GET", "/api/users/zz", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn test_register_validation() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/register",
            Some(&mint_token("ana", None)),
            Some(json!({"role": "owner"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await["errors"].clone();
    assert!(errors
        .as_array()
        .unwrap()
        .contains(&json!("Display name is required")));
}
