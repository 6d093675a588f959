//! Request/response types for the event endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Date,
}

/// One input of an event's registration form.
#[derive(Debug, Deserialize, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct RegistrationField {
    pub title: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default, alias = "registrationForm")]
    pub registration_fields: Vec<RegistrationField>,
    #[serde(default)]
    pub is_registration_required: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "registrationForm")]
    pub registration_fields: Option<Vec<RegistrationField>>,
    pub is_registration_required: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: Option<String>,
    pub category: String,
    pub registration_form: Vec<RegistrationField>,
    /// Attendee submissions, free-form JSON objects keyed by form field title.
    #[schema(value_type = Vec<Object>)]
    pub registrations: Vec<Value>,
    pub registration_link: Option<String>,
    pub is_registration_required: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub message: String,
    pub event: EventResponse,
}
