use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    parse_event_id, required,
    storage::{
        delete_owned_event, fetch_event, fetch_events_by_owner, insert_event, update_owned_event,
        EventChanges, NewEvent,
    },
    types::{CreateEventRequest, EventResponse, UpdateEventRequest},
    validate_form, EVENT_NOT_FOUND,
};
use crate::{
    api::{
        handlers::{invalid_payload, ApiConfig, ApiError, ErrorBody, MessageResponse},
        identity::authenticate,
        Identity,
    },
    auth::TokenAuthority,
};

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create_event(
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
    config: Extension<Arc<ApiConfig>>,
    payload: Option<Json<CreateEventRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return invalid_payload();
    };

    let id = Uuid::new_v4();
    let registration_link = config.registration_link(id);
    let event = match new_event(&request, id, identity.user_id, &registration_link) {
        Ok(event) => event,
        Err(err) => return err.into_response(),
    };

    match insert_event(&pool, &event).await {
        Ok(record) => {
            debug!(event_id = %id, "event created");
            (StatusCode::CREATED, Json(record.into_event())).into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Events owned by the caller", body = [EventResponse]),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_events(
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match fetch_events_by_owner(&pool, identity.user_id).await {
        Ok(records) => Json(
            records
                .into_iter()
                .map(|record| record.into_event())
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event; registrations are only listed for the owner", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorBody),
    ),
    security((), ("bearer" = [])),
    tag = "events"
)]
#[instrument(skip(headers, tokens, pool))]
pub async fn get_event(
    Path(id): Path<String>,
    headers: HeaderMap,
    tokens: Extension<Arc<TokenAuthority>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    // Public route: a bearer token is optional and only unlocks registrations.
    let viewer = authenticate(&headers, &tokens)
        .ok()
        .map(|identity| identity.user_id);

    match fetch_event(&pool, id).await {
        Ok(Some(record)) => Json(record.into_event_for(viewer)).into_response(),
        Ok(None) => ApiError::NotFound(EVENT_NOT_FOUND).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    request_body = UpdateEventRequest,
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "No usable fields or blank required fields", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "Event not found or not owned by the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
#[instrument(skip(pool, payload), fields(user_id = %identity.user_id))]
pub async fn update_event(
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdateEventRequest>>,
) -> impl IntoResponse {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let Some(Json(request)) = payload else {
        return invalid_payload();
    };

    let changes = match event_changes(&request) {
        Ok(changes) => changes,
        Err(err) => return err.into_response(),
    };

    match update_owned_event(&pool, id, identity.user_id, &changes).await {
        Ok(Some(record)) => Json(record.into_event()).into_response(),
        Ok(None) => ApiError::NotFound(EVENT_NOT_FOUND).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "Event not found or not owned by the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
#[instrument(skip(pool), fields(user_id = %identity.user_id))]
pub async fn delete_event(
    Path(id): Path<String>,
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let id = match parse_event_id(&id) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    match delete_owned_event(&pool, id, identity.user_id).await {
        Ok(true) => Json(MessageResponse::new("Event deleted successfully")).into_response(),
        Ok(false) => ApiError::NotFound(EVENT_NOT_FOUND).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn new_event<'a>(
    request: &'a CreateEventRequest,
    id: Uuid,
    user_id: Uuid,
    registration_link: &'a str,
) -> Result<NewEvent<'a>, ApiError> {
    validate_form(&request.registration_fields)?;

    Ok(NewEvent {
        id,
        user_id,
        name: required("name", &request.name)?,
        date: required("date", &request.date)?,
        time: required("time", &request.time)?,
        location: required("location", &request.location)?,
        description: request.description.as_deref().map(str::trim),
        category: required("category", &request.category)?,
        registration_form: &request.registration_fields,
        registration_link,
        is_registration_required: request.is_registration_required,
    })
}

/// Provided required fields must not be blank; `description` may be cleared.
fn event_changes(request: &UpdateEventRequest) -> Result<EventChanges<'_>, ApiError> {
    if let Some(fields) = &request.registration_fields {
        validate_form(fields)?;
    }

    let changes = EventChanges {
        name: optional("name", request.name.as_deref())?,
        date: optional("date", request.date.as_deref())?,
        time: optional("time", request.time.as_deref())?,
        location: optional("location", request.location.as_deref())?,
        description: request.description.as_deref().map(str::trim),
        category: optional("category", request.category.as_deref())?,
        registration_form: request.registration_fields.as_deref(),
        is_registration_required: request.is_registration_required,
    };

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    Ok(changes)
}

fn optional<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, ApiError> {
    value.map(|value| required(field, value)).transpose()
}
