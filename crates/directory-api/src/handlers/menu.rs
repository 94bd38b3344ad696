//! Public menu handlers used by page rendering

use axum::{
    extract::{Path, State},
    Json,
};

use directory_core::DisplayMenuItem;

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Menu forest for a location - GET /api/v1/menus/{location}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<DisplayMenuItem>>>> {
    let forest = state.menu_service.get_menu_items_for_location(&location).await?;
    Ok(Json(ApiResponse::success(forest)))
}
