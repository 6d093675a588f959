//! SQL storage helpers for events.
//!
//! The registration form and the attendee submissions live in `JSONB`
//! columns. Writes that need an owner are scoped by `user_id` in the same
//! statement, so a non-owner simply matches no row.

use serde_json::Value;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::types::{EventResponse, RegistrationField};

const EVENT_COLUMNS: &str = "id, user_id, name, event_date, event_time, location, description, \
     category, registration_form, registrations, registration_link, is_registration_required";

#[derive(Debug)]
pub(super) struct EventRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    date: String,
    time: String,
    location: String,
    description: Option<String>,
    category: String,
    registration_form: Vec<RegistrationField>,
    registrations: Vec<Value>,
    registration_link: Option<String>,
    is_registration_required: bool,
}

impl EventRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let Json(registration_form): Json<Vec<RegistrationField>> =
            row.try_get("registration_form")?;
        let Json(registrations): Json<Vec<Value>> = row.try_get("registrations")?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            date: row.try_get("event_date")?,
            time: row.try_get("event_time")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            registration_form,
            registrations,
            registration_link: row.try_get("registration_link")?,
            is_registration_required: row.try_get("is_registration_required")?,
        })
    }

    /// Response view for `viewer`; attendee submissions are only shown to the
    /// owner.
    pub(super) fn into_event_for(mut self, viewer: Option<Uuid>) -> EventResponse {
        if viewer != Some(self.user_id) {
            self.registrations.clear();
        }
        self.into_event()
    }

    pub(super) fn into_event(self) -> EventResponse {
        EventResponse {
            id: self.id.to_string(),
            user_id: self.user_id.to_string(),
            name: self.name,
            date: self.date,
            time: self.time,
            location: self.location,
            description: self.description,
            category: self.category,
            registration_form: self.registration_form,
            registrations: self.registrations,
            registration_link: self.registration_link,
            is_registration_required: self.is_registration_required,
        }
    }
}

/// Column values for a new event.
#[derive(Debug)]
pub(super) struct NewEvent<'a> {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    pub(super) name: &'a str,
    pub(super) date: &'a str,
    pub(super) time: &'a str,
    pub(super) location: &'a str,
    pub(super) description: Option<&'a str>,
    pub(super) category: &'a str,
    pub(super) registration_form: &'a [RegistrationField],
    pub(super) registration_link: &'a str,
    pub(super) is_registration_required: bool,
}

/// Columns changed by an update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub(super) struct EventChanges<'a> {
    pub(super) name: Option<&'a str>,
    pub(super) date: Option<&'a str>,
    pub(super) time: Option<&'a str>,
    pub(super) location: Option<&'a str>,
    pub(super) description: Option<&'a str>,
    pub(super) category: Option<&'a str>,
    pub(super) registration_form: Option<&'a [RegistrationField]>,
    pub(super) is_registration_required: Option<bool>,
}

impl EventChanges<'_> {
    pub(super) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.registration_form.is_none()
            && self.is_registration_required.is_none()
    }
}

pub(super) async fn insert_event(
    pool: &PgPool,
    event: &NewEvent<'_>,
) -> Result<EventRecord, sqlx::Error> {
    let query = format!(
        "INSERT INTO events (id, user_id, name, event_date, event_time, location, description, \
            category, registration_form, registration_link, is_registration_required) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {EVENT_COLUMNS}"
    );
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.name)
        .bind(event.date)
        .bind(event.time)
        .bind(event.location)
        .bind(event.description)
        .bind(event.category)
        .bind(Json(event.registration_form))
        .bind(event.registration_link)
        .bind(event.is_registration_required)
        .fetch_one(pool)
        .instrument(span)
        .await?;

    EventRecord::from_row(&row)
}

pub(super) async fn fetch_events_by_owner(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<EventRecord>, sqlx::Error> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = $1 ORDER BY created_at, id"
    );
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await?;

    rows.iter().map(EventRecord::from_row).collect()
}

pub(super) async fn fetch_event(pool: &PgPool, id: Uuid) -> Result<Option<EventRecord>, sqlx::Error> {
    let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.as_ref().map(EventRecord::from_row).transpose()
}

/// Apply `changes` to an event owned by `user_id`. `None` when no such event.
pub(super) async fn update_owned_event(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    changes: &EventChanges<'_>,
) -> Result<Option<EventRecord>, sqlx::Error> {
    let query = format!(
        "UPDATE events SET \
            name = COALESCE($3, name), \
            event_date = COALESCE($4, event_date), \
            event_time = COALESCE($5, event_time), \
            location = COALESCE($6, location), \
            description = COALESCE($7, description), \
            category = COALESCE($8, category), \
            registration_form = COALESCE($9, registration_form), \
            is_registration_required = COALESCE($10, is_registration_required) \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {EVENT_COLUMNS}"
    );
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(id)
        .bind(user_id)
        .bind(changes.name)
        .bind(changes.date)
        .bind(changes.time)
        .bind(changes.location)
        .bind(changes.description)
        .bind(changes.category)
        .bind(changes.registration_form.map(Json))
        .bind(changes.is_registration_required)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.as_ref().map(EventRecord::from_row).transpose()
}

/// Delete an event owned by `user_id`. Returns whether a row was removed.
pub(super) async fn delete_owned_event(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let query = "DELETE FROM events WHERE id = $1 AND user_id = $2";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Append one attendee submission and return the updated event.
pub(super) async fn append_registration(
    pool: &PgPool,
    id: Uuid,
    registration: &Value,
) -> Result<Option<EventRecord>, sqlx::Error> {
    let query = format!(
        "UPDATE events SET registrations = registrations || jsonb_build_array($2::jsonb) \
         WHERE id = $1 \
         RETURNING {EVENT_COLUMNS}"
    );
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(id)
        .bind(Json(registration))
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.as_ref().map(EventRecord::from_row).transpose()
}
