//! REST API Integration Tests
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`,
//! backed by a real temporary SQLite database per test.
//!
//! ## Coverage
//!
//! - Auth flow: register, login, me, logout, refresh
//! - Error envelope: `{ success: false, error: { message, status } }`
//! - User, map, and node CRUD including the pinned 400/404/409 messages
//! - Hierarchy operations over HTTP: move, subtree delete, auto-layout

#[cfg(test)]
mod api_tests {
    use anyhow::Result;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use mindmapper_core::db::{DatabaseService, MindmapStore, TursoStore};
    use mindmapper_server::{create_router, AppState};

    /// Build a router over a fresh temporary database
    async fn test_app() -> Result<(Router, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("api_test.db");

        let db = Arc::new(DatabaseService::new(db_path).await?);
        let store: Arc<dyn MindmapStore> = Arc::new(TursoStore::new(db));

        Ok((create_router(AppState::new(store)), temp_dir))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn authed_request(method: Method, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json(response: Response) -> Result<Value> {
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Assert the shared error envelope
    fn assert_error(body: &Value, status: u16, message: &str) {
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["status"], json!(status));
        assert_eq!(body["error"]["message"], json!(message));
    }

    /// Register alice and return (user_id, access_token, refresh_token)
    async fn register_alice(app: &Router) -> Result<(String, String, String)> {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/register",
                json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "correct horse battery",
                }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await?;
        Ok((
            body["user"]["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        ))
    }

    async fn create_map(app: &Router, user_id: &str, title: &str) -> Result<String> {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/maps",
                json!({ "userId": user_id, "title": title }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await?;
        Ok(body["id"].as_str().unwrap().to_string())
    }

    async fn create_node(
        app: &Router,
        map_id: &str,
        label: &str,
        parent_id: Option<&str>,
    ) -> Result<String> {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/nodes",
                json!({ "mapId": map_id, "label": label, "parentId": parent_id }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await?;
        Ok(body["id"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_register_me_logout_flow() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (_user_id, token, _refresh) = register_alice(&app).await?;

        // The access token authenticates /auth/me
        let response = app
            .clone()
            .oneshot(authed_request(Method::GET, "/api/auth/me", &token))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await?;
        assert_eq!(body["username"], json!("alice"));
        assert_eq!(body["email"], json!("alice@example.com"));
        assert!(body.get("passwordHash").is_none());

        // Logout revokes exactly that token
        let response = app
            .clone()
            .oneshot(authed_request(Method::POST, "/api/auth/logout", &token))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await?["success"], json!(true));

        let response = app
            .clone()
            .oneshot(authed_request(Method::GET, "/api/auth/me", &token))
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_error(
            &read_json(response).await?,
            401,
            "Invalid or expired token",
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_register_missing_fields_and_duplicates() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/auth/register", json!({})))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(
            &read_json(response).await?,
            400,
            "Missing required fields: username, email, password",
        );

        register_alice(&app).await?;

        // Same email, fresh username
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/register",
                json!({
                    "username": "alice2",
                    "email": "alice@example.com",
                    "password": "correct horse battery",
                }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_error(
            &read_json(response).await?,
            409,
            "User with this email already exists",
        );

        // Fresh email, same username
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/register",
                json!({
                    "username": "alice",
                    "email": "alice2@example.com",
                    "password": "correct horse battery",
                }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_error(
            &read_json(response).await?,
            409,
            "User with this username already exists",
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials_uniformly() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        register_alice(&app).await?;

        for credentials in [
            json!({ "email": "alice@example.com", "password": "wrong password" }),
            json!({ "email": "nobody@example.com", "password": "correct horse battery" }),
        ] {
            let response = app
                .clone()
                .oneshot(json_request(Method::POST, "/api/auth/login", credentials))
                .await?;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_error(&read_json(response).await?, 401, "Invalid email or password");
        }

        // And the real password still works
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/login",
                json!({ "email": "alice@example.com", "password": "correct horse battery" }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_json(response).await?["token"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_issues_a_new_access_token() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (_user_id, token, refresh) = register_alice(&app).await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/refresh",
                json!({ "refreshToken": refresh }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let new_token = read_json(response).await?["token"]
            .as_str()
            .unwrap()
            .to_string();
        assert_ne!(new_token, token);

        // The fresh token is a live access token
        let response = app
            .clone()
            .oneshot(authed_request(Method::GET, "/api/auth/me", &new_token))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        // Empty body is a validation error, not a 401
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/auth/refresh", json!({})))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(&read_json(response).await?, 400, "Refresh token is required");

        // An access token is not accepted in place of a refresh token
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/refresh",
                json!({ "refreshToken": token }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_error(
            &read_json(response).await?,
            401,
            "Invalid or expired refresh token",
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_user_crud_over_http() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/users",
                json!({
                    "username": "bob",
                    "email": "bob@example.com",
                    "password": "hunter2hunter2",
                }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let profile = read_json(response).await?;
        let user_id = profile["id"].as_str().unwrap().to_string();
        assert_eq!(profile["username"], json!("bob"));
        assert!(profile.get("passwordHash").is_none());

        let response = app.clone().oneshot(get_request("/api/users")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let users = read_json(response).await?;
        assert_eq!(users.as_array().map(|a| a.len()), Some(1));

        let response = app
            .clone()
            .oneshot(get_request("/api/users/does-not-exist"))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_error(&read_json(response).await?, 404, "User not found");

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/users/{}", user_id),
                json!({ "username": "bobby" }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/users/{}/maps", user_id)))
            .await?;
        let with_maps = read_json(response).await?;
        assert_eq!(with_maps["username"], json!("bobby"));
        assert_eq!(with_maps["maps"], json!([]));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/users/{}", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await?;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("User deleted successfully"));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/users/{}", user_id)))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_map_crud_over_http() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (user_id, _token, _refresh) = register_alice(&app).await?;

        // userId is the one required field
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/maps", json!({})))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(
            &read_json(response).await?,
            400,
            "Missing required field: userId",
        );

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/maps",
                json!({ "userId": user_id }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let untitled = read_json(response).await?;
        assert_eq!(untitled["title"], json!("Untitled Mindmap"));

        let roadmap_id = create_map(&app, &user_id, "Roadmap").await?;

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/maps/user/{}", user_id)))
            .await?;
        let maps = read_json(response).await?;
        assert_eq!(maps.as_array().map(|a| a.len()), Some(2));

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/maps/{}", roadmap_id),
                json!({ "title": "Roadmap 2026" }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/maps/{}", roadmap_id)))
            .await?;
        assert_eq!(read_json(response).await?["title"], json!("Roadmap 2026"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/maps/{}", roadmap_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await?;
        let body = read_json(response).await?;
        assert_eq!(body["message"], json!("Map deleted successfully"));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/maps/{}", roadmap_id)))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_error(&read_json(response).await?, 404, "Map not found");

        Ok(())
    }

    #[tokio::test]
    async fn test_node_crud_and_field_validation() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (user_id, _token, _refresh) = register_alice(&app).await?;
        let map_id = create_map(&app, &user_id, "Nodes").await?;

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/nodes", json!({})))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(
            &read_json(response).await?,
            400,
            "Missing required field: mapId",
        );

        // mapId alone gets the documented defaults
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/nodes",
                json!({ "mapId": map_id }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let root = read_json(response).await?;
        assert_eq!(root["label"], json!("New Node"));
        assert_eq!(root["posX"].as_f64(), Some(0.0));
        assert_eq!(root["parentId"], json!(null));
        let root_id = root["id"].as_str().unwrap().to_string();

        create_node(&app, &map_id, "Child", Some(&root_id)).await?;

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/map/{}", map_id)))
            .await?;
        let nodes = read_json(response).await?;
        assert_eq!(nodes.as_array().map(|a| a.len()), Some(2));

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/nodes/{}", root_id),
                json!({ "label": "Renamed" }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        // Position needs both coordinates
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/position", root_id),
                json!({ "posX": 12.5 }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(
            &read_json(response).await?,
            400,
            "Missing required fields: posX, posY",
        );

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/position", root_id),
                json!({ "posX": 12.5, "posY": -3.0 }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/{}", root_id)))
            .await?;
        let updated = read_json(response).await?;
        assert_eq!(updated["posX"].as_f64(), Some(12.5));
        assert_eq!(updated["posY"].as_f64(), Some(-3.0));
        assert_eq!(updated["label"], json!("Renamed"));

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/label", root_id),
                json!({}),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_error(
            &read_json(response).await?,
            400,
            "Missing required field: label",
        );

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/label", root_id),
                json!({ "label": "Titled" }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_move_and_subtree_delete_over_http() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (user_id, _token, _refresh) = register_alice(&app).await?;
        let map_id = create_map(&app, &user_id, "Hierarchy").await?;

        let root = create_node(&app, &map_id, "Root", None).await?;
        let a = create_node(&app, &map_id, "A", Some(&root)).await?;
        let b = create_node(&app, &map_id, "B", Some(&a)).await?;

        // Moving the root under its own descendant is rejected
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/move", root),
                json!({ "parentId": b }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await?;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["status"], json!(400));

        // B hops from A to the root node
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/move", b),
                json!({ "parentId": root }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        // Explicit null detaches B entirely
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/nodes/{}/move", b),
                json!({ "parentId": null }),
            ))
            .await?;
        assert_eq!(read_json(response).await?["affectedCount"], json!(1));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/{}", b)))
            .await?;
        assert_eq!(read_json(response).await?["parentId"], json!(null));

        // Deleting the root now removes root + A but spares detached B
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/nodes/{}", root))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await?;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Node deleted successfully"));
        assert_eq!(body["deletedCount"], json!(2));

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/{}", a)))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_error(&read_json(response).await?, 404, "Node not found");

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/{}", b)))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        Ok(())
    }

    #[tokio::test]
    async fn test_layout_endpoint_positions_a_map() -> Result<()> {
        let (app, _temp_dir) = test_app().await?;
        let (user_id, _token, _refresh) = register_alice(&app).await?;
        let map_id = create_map(&app, &user_id, "Layout").await?;

        let root = create_node(&app, &map_id, "Root", None).await?;
        create_node(&app, &map_id, "Left", Some(&root)).await?;
        create_node(&app, &map_id, "Right", Some(&root)).await?;

        // Default vertical layout: root centered over a two-child block
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/maps/{}/layout", map_id),
                json!({}),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await?;
        let nodes = body["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);

        let root_node = nodes.iter().find(|n| n["id"] == json!(root)).unwrap();
        assert_eq!(root_node["posX"].as_f64(), Some(111.0));
        assert_eq!(root_node["posY"].as_f64(), Some(0.0));

        let mut child_xs: Vec<f64> = nodes
            .iter()
            .filter(|n| n["id"] != json!(root))
            .map(|n| n["posX"].as_f64().unwrap())
            .collect();
        child_xs.sort_by(f64::total_cmp);
        assert_eq!(child_xs, vec![0.0, 222.0]);
        assert!(nodes
            .iter()
            .filter(|n| n["id"] != json!(root))
            .all(|n| n["posY"].as_f64() == Some(136.0)));

        // The compact preset tightens the rank gap
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/maps/{}/layout", map_id),
                json!({ "preset": "compact" }),
            ))
            .await?;
        let body = read_json(response).await?;
        assert!(body["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|n| n["id"] != json!(root))
            .all(|n| n["posY"].as_f64() == Some(96.0)));

        // Explicit direction override flips the main axis
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/maps/{}/layout", map_id),
                json!({ "direction": "LR" }),
            ))
            .await?;
        let body = read_json(response).await?;
        let nodes = body["nodes"].as_array().unwrap();
        let root_node = nodes.iter().find(|n| n["id"] == json!(root)).unwrap();
        assert_eq!(root_node["posX"].as_f64(), Some(0.0));
        assert!(nodes
            .iter()
            .filter(|n| n["id"] != json!(root))
            .all(|n| n["posX"].as_f64() == Some(272.0)));

        // The new positions are persisted, not just returned
        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/nodes/{}", root)))
            .await?;
        assert_eq!(read_json(response).await?["posX"].as_f64(), Some(0.0));

        // Unknown map answers 404
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/maps/does-not-exist/layout",
                json!({}),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_error(&read_json(response).await?, 404, "Map not found");

        Ok(())
    }
}
