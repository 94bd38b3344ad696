// ============================================================================
// Directory API - Admin Menu Handlers
// File: crates/directory-api/src/handlers/admin.rs
// ============================================================================
//! Menu administration. Every write goes through `MenuService`, which
//! invalidates the cached forest of the affected location.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use directory_core::services::{MenuCacheStats, MenuItemIssue};
use directory_core::{DomainError, Menu, MenuItem, MenuItemPatch, NewMenuItem};

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateCacheRequest {
    /// Omit to clear every location
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateCacheResponse {
    pub scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// List menus - GET /api/v1/admin/menus
pub async fn list_menus(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Menu>>>> {
    let menus = state.menu_service.list_menus().await?;
    Ok(Json(ApiResponse::success(menus)))
}

/// Get or create the menu of a location - POST /api/v1/admin/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Json(payload): Json<CreateMenuRequest>,
) -> ApiResult<Json<ApiResponse<Menu>>> {
    let menu = state
        .menu_service
        .get_or_create_menu(&payload.name, &payload.location)
        .await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// Delete a location's menu and its items - DELETE /api/v1/admin/menus/{location}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let menu = state
        .menu_service
        .get_menu(&location)
        .await?
        .ok_or(DomainError::MenuNotFound(location))?;
    state.menu_service.delete_menu(&menu.id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Flat items of a location - GET /api/v1/admin/menus/{location}/items
pub async fn list_items(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<MenuItem>>>> {
    let items = state.menu_service.list_menu_items(&location).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Create item - POST /api/v1/admin/menus/{location}/items
pub async fn create_item(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Json(payload): Json<NewMenuItem>,
) -> ApiResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
    let item = state.menu_service.create_item(&location, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Structural issues of a location - GET /api/v1/admin/menus/{location}/lint
pub async fn lint_menu(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<MenuItemIssue>>>> {
    let issues = state.menu_service.lint_location(&location).await?;
    Ok(Json(ApiResponse::success(issues)))
}

/// Update item - PUT /api/v1/admin/menu-items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemPatch>,
) -> ApiResult<Json<ApiResponse<MenuItem>>> {
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let item = state.menu_service.update_item(&id, payload).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete item - DELETE /api/v1/admin/menu-items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.menu_service.delete_item(&id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Cache counters - GET /api/v1/admin/menu-cache
pub async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<MenuCacheStats>> {
    Json(ApiResponse::success(state.menu_service.cache().stats()))
}

/// Drop cached forests - POST /api/v1/admin/menu-cache/invalidate
///
/// An empty body clears every location.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<InvalidateCacheResponse>>> {
    let request: InvalidateCacheRequest = if body.is_empty() {
        InvalidateCacheRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let response = match request.location {
        Some(location) => {
            state.menu_service.invalidate_cache_for_location(&location);
            InvalidateCacheResponse {
                scope: "location",
                location: Some(location),
            }
        }
        None => {
            state.menu_service.invalidate_all_caches();
            InvalidateCacheResponse {
                scope: "all",
                location: None,
            }
        }
    };

    Ok(Json(ApiResponse::success(response)))
}
