use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use directory_api::{router, AppState};
use directory_core::repositories::MenuRepository;
use directory_core::services::{MenuCache, MenuService};
use directory_core::{Menu, MenuItem};
use directory_infrastructure::InMemoryMenuRepository;

fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn footer_menu() -> Menu {
    let now = Utc::now();
    Menu {
        id: id(100),
        name: "Footer".to_string(),
        location: "footer".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn footer_item(n: u128, parent: Option<u128>, order: i32, label: &str) -> MenuItem {
    let now = Utc::now();
    MenuItem {
        id: id(n),
        menu_id: id(100),
        parent_id: parent.map(id),
        label: label.to_string(),
        url: "#".to_string(),
        target: None,
        order: Some(order),
        created_at: now,
        updated_at: now,
    }
}

fn seeded_repo() -> Arc<InMemoryMenuRepository> {
    Arc::new(InMemoryMenuRepository::with_data(
        vec![footer_menu()],
        vec![
            footer_item(1, None, 0, "Home"),
            footer_item(2, Some(1), 0, "About"),
            footer_item(3, None, 1, "Contact"),
        ],
    ))
}

fn app(repo: Arc<InMemoryMenuRepository>) -> Router {
    let repo: Arc<dyn MenuRepository> = repo;
    let service = Arc::new(MenuService::new(repo, Arc::new(MenuCache::default())));
    router(AppState::new(service))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn labels(forest: &Value) -> Vec<String> {
    forest
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["label"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_footer_menu_forest() {
    let app = app(seeded_repo());

    let (status, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let forest = &body["data"];
    assert_eq!(labels(forest), vec!["Home", "Contact"]);
    assert_eq!(labels(&forest[0]["children"]), vec!["About"]);
    assert_eq!(forest[0]["children"][0]["children"], json!([]));
    assert_eq!(forest[1]["children"], json!([]));
    assert!(forest[0].get("parentId").is_none());
}

#[tokio::test]
async fn test_unknown_location_is_empty() {
    let app = app(seeded_repo());

    let (status, body) = send(&app, Method::GET, "/api/v1/menus/sidebar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, Method::GET, "/api/v1/admin/menus", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_out_of_band_write_visible_after_invalidation() {
    let repo = seeded_repo();
    let app = app(repo.clone());

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["Home", "Contact"]);

    // Written straight to the store, so nothing invalidated the cache.
    repo.create_item(&footer_item(4, None, 2, "Blog")).await.unwrap();
    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["Home", "Contact"]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/menu-cache/invalidate",
        Some(json!({ "location": "footer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scope"], "location");

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["Home", "Contact", "Blog"]);
}

#[tokio::test]
async fn test_invalidate_all_with_empty_body() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    let (status, body) = send(&app, Method::POST, "/api/v1/admin/menu-cache/invalidate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scope"], "all");

    let (_, body) = send(&app, Method::GET, "/api/v1/admin/menu-cache", None).await;
    assert_eq!(body["data"]["entries"], 0);
}

#[tokio::test]
async fn test_admin_create_item_refreshes_cached_forest() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/menus/footer/items",
        Some(json!({
            "label": "Team",
            "url": "/about/team",
            "order": 1,
            "parentId": id(1),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["menuId"], json!(id(100)));

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"][0]["children"]), vec!["About", "Team"]);
}

#[tokio::test]
async fn test_admin_create_item_for_new_location() {
    let app = app(seeded_repo());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/admin/menus/header/items",
        Some(json!({ "label": "Listings", "url": "/listings" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/header", None).await;
    assert_eq!(labels(&body["data"]), vec!["Listings"]);
}

#[tokio::test]
async fn test_admin_rejects_unknown_parent() {
    let app = app(seeded_repo());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/menus/footer/items",
        Some(json!({ "label": "Ghost", "url": "#", "parentId": id(999) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_update_moves_item() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    let uri = format!("/api/v1/admin/menu-items/{}", id(3));
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "parentId": id(1), "order": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parentId"], json!(id(1)));

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["Home"]);
    assert_eq!(labels(&body["data"][0]["children"]), vec!["About", "Contact"]);
}

#[tokio::test]
async fn test_admin_update_rejects_blank_label() {
    let app = app(seeded_repo());

    let uri = format!("/api/v1/admin/menu-items/{}", id(3));
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "label": "   ", "url": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["Home", "Contact"]);
}

#[tokio::test]
async fn test_admin_update_missing_item() {
    let app = app(seeded_repo());

    let uri = format!("/api/v1/admin/menu-items/{}", id(42));
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "label": "Nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_deleting_parent_demotes_children_and_lint_reports_them() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    let uri = format!("/api/v1/admin/menu-items/{}", id(1));
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(labels(&body["data"]), vec!["About", "Contact"]);

    let (_, body) = send(&app, Method::GET, "/api/v1/admin/menus/footer/lint", None).await;
    assert_eq!(body["data"][0]["kind"], "orphan");
    assert_eq!(body["data"][0]["itemId"], json!(id(2)));
}

#[tokio::test]
async fn test_deleting_last_items_empties_cached_forest() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    for n in [2, 1, 3] {
        let uri = format!("/api/v1/admin/menu-items/{}", id(n));
        send(&app, Method::DELETE, &uri, None).await;
    }

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_delete_menu_by_location() {
    let app = app(seeded_repo());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/admin/menus/footer", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(&app, Method::DELETE, "/api/v1/admin/menus/footer", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deeply_nested_rows_render_without_overflow() {
    let chain: Vec<MenuItem> = (1..=10_000u128)
        .map(|n| footer_item(n, (n > 1).then(|| n - 1), 0, "Level"))
        .collect();
    let repo = Arc::new(InMemoryMenuRepository::with_data(vec![footer_menu()], chain));
    let app = app(repo);

    let (status, body) = send(&app, Method::GET, "/api/v1/menus/footer", None).await;
    assert_eq!(status, StatusCode::OK);

    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 313);
    assert_eq!(roots[0]["id"], json!(id(1)));
    assert_eq!(roots[1]["id"], json!(id(33)));
}

#[tokio::test]
async fn test_admin_rejects_nesting_past_max_depth() {
    let chain: Vec<MenuItem> = (1..=32u128)
        .map(|n| footer_item(n, (n > 1).then(|| n - 1), 0, "Level"))
        .collect();
    let app = app(Arc::new(InMemoryMenuRepository::with_data(vec![footer_menu()], chain)));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/menus/footer/items",
        Some(json!({ "label": "Too deep", "url": "#", "parentId": id(32) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health() {
    let app = app(seeded_repo());
    send(&app, Method::GET, "/api/v1/menus/footer", None).await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cachedLocations"], 1);
}
