use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::{
    parse_event_id,
    storage::append_registration,
    types::{EventResponse, RegistrationResponse},
    EVENT_NOT_FOUND,
};
use crate::api::handlers::{invalid_payload, ApiError, ErrorBody};

#[utoipa::path(
    post,
    path = "/api/events/register/{id}",
    request_body(
        content = Object,
        description = "Answers to the event's registration form, keyed by field title"
    ),
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Registration stored; the event is returned without registrations", body = RegistrationResponse),
        (status = 400, description = "Payload is not a JSON object", body = ErrorBody),
        (status = 404, description = "Event not found", body = ErrorBody),
    ),
    tag = "events"
)]
#[instrument(skip(pool, payload))]
pub async fn register_attendee(
    Path(id): Path<String>,
    pool: Extension<PgPool>,
    payload: Option<Json<Value>>,
) -> impl IntoResponse {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let registration = match payload {
        Some(Json(value)) if value.is_object() => value,
        Some(_) => {
            return ApiError::BadRequest("Registration must be a JSON object".to_string())
                .into_response()
        }
        None => return invalid_payload(),
    };

    match append_registration(&pool, id, &registration).await {
        Ok(Some(record)) => {
            debug!(event_id = %id, "registration stored");
            // the submitter is not the owner; other attendees stay hidden
            let event: EventResponse = record.into_event_for(None);
            Json(RegistrationResponse {
                message: "Registration successful".to_string(),
                event,
            })
            .into_response()
        }
        Ok(None) => ApiError::NotFound(EVENT_NOT_FOUND).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}
