//! Event endpoints.
//!
//! Events belong to the user who created them. Listing, creating, updating and
//! deleting run behind the bearer middleware; updates and deletes are scoped
//! to the owner in SQL and answer 404 for anyone else so existence is not
//! leaked. Reading a single event and submitting an attendee registration are
//! public, because the registration link is shared with attendees. Stored
//! registrations are only returned to the owner.
//!
//! Flow Overview:
//! 1) Create: validate, generate the id, store the form and the registration
//!    link `<frontend>/register/<id>`.
//! 2) Update/Delete: owner-scoped writes, blank required fields rejected.
//! 3) Register: append one free-form JSON object to `registrations`.

pub(crate) mod crud;
pub(crate) mod registrations;
mod storage;
pub(crate) mod types;

use uuid::Uuid;

use super::ApiError;
use types::RegistrationField;

const EVENT_NOT_FOUND: &str = "Event not found";

/// Ids that do not parse cannot name a stored event.
fn parse_event_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(EVENT_NOT_FOUND))
}

/// Trimmed value of a required text field.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}

fn validate_form(fields: &[RegistrationField]) -> Result<(), ApiError> {
    if fields.iter().any(|field| field.title.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "Registration field title is required".to_string(),
        ));
    }
    Ok(())
}
