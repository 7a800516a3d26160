use api_types::StatusResponse;
use axum::Json;

pub async fn get() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}
