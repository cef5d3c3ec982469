use axum::Json;
use crate::models::StatusResponse;

// GET /api/status - same answer every time, no state involved
pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse::online())
}
