use axum::{response::IntoResponse, Json};

use super::MessageResponse;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse),
    ),
    tag = "health"
)]
pub async fn root() -> impl IntoResponse {
    Json(MessageResponse::new("hello it's working"))
}
