use axum::response::Json;

use super::ApiResponse;

/// GET /ping
pub async fn ping() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success_msg("pong"))
}
