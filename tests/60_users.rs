#[macro_use]
mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn admin_assigns_roles() -> Result<()> {
    let app = test_app!();
    let (_, admin) = app.signup("admin@example.com").await?;
    let (user_id, user) = app.signup("user@example.com").await?;

    let path = format!("/api/v1/users/{user_id}/role");
    let (status, _) = app.put(&path, &user, json!({ "role": "admin" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "users cannot promote themselves");

    let (status, body) = app.put(&path, &admin, json!({ "role": "superuser" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("role").is_some());

    let (status, body) = app.put(&path, &admin, json!({ "role": "admin" })).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("password_hash").is_none());

    // Promotion takes effect on the next request with the same token
    let (status, body) = app.put(&path, &user, json!({ "role": "user" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "user");

    let (status, _) = app
        .put(&format!("/api/v1/users/{}/role", uuid::Uuid::new_v4()), &admin, json!({ "role": "user" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.cleanup().await
}

#[tokio::test]
async fn user_listing_filters_by_role_and_search() -> Result<()> {
    let app = test_app!();
    let (_, admin) = app.signup("admin@example.com").await?;
    app.register("grace@example.com", json!({ "first_name": "Grace", "last_name": "Hopper" })).await?;
    app.register("alan@example.com", json!({ "first_name": "Alan", "last_name": "Turing" })).await?;

    let (status, body) = app.get("/api/v1/users", &admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"][0]["email"], "alan@example.com", "newest first");

    let (_, body) = app.get("/api/v1/users?role=admin", &admin).await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["email"], "admin@example.com");

    let (_, body) = app.get("/api/v1/users?role=user&search=HOPP", &admin).await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["first_name"], "Grace");

    let (status, body) = app.get("/api/v1/users?role=root", &admin).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("role").is_some());

    let (_, body) = app.get("/api/v1/users?limit=2", &admin).await?;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["limit"], 2);

    app.cleanup().await
}

#[tokio::test]
async fn profile_read_and_update() -> Result<()> {
    let app = test_app!();
    let (user_id, token) = app.signup("ada@example.com").await?;
    app.signup("taken@example.com").await?;

    let (status, body) = app.get("/api/v1/users/profile", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user_id.as_str());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app
        .put(
            "/api/v1/users/profile",
            &token,
            json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada.l@example.com" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["email"], "ada.l@example.com");
    assert_eq!(body["data"]["last_name"], "Lovelace");

    let (status, body) = app
        .put(
            "/api/v1/users/profile",
            &token,
            json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "taken@example.com" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = app
        .put("/api/v1/users/profile", &token, json!({ "first_name": "", "last_name": "L", "email": "a@b.co" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("first_name").is_some());

    let (_, body) = app.login("ada.l@example.com", common::PASSWORD).await?;
    assert_eq!(body["data"]["user"]["id"], user_id.as_str());

    app.cleanup().await
}
