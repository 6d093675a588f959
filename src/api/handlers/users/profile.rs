use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use tracing::instrument;

use super::{
    storage::{find_by_id, update_profile, ProfileChanges},
    types::{Gender, ProfileUpdateRequest, ProfileUpdateResponse, UserResponse},
};
use crate::api::{
    handlers::{
        invalid_payload, is_unique_violation, non_blank, normalize_email, valid_email, ApiError,
        ErrorBody,
    },
    Identity,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn get_profile(
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match find_by_id(&pool, identity.user_id).await {
        Ok(Some(user)) => Json(user.to_response()).into_response(),
        Ok(None) => ApiError::NotFound("User not found").into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "No usable fields or invalid values", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn put_profile(
    Extension(identity): Extension<Identity>,
    pool: Extension<PgPool>,
    payload: Option<Json<ProfileUpdateRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return invalid_payload();
    };

    let changes = match profile_changes(&request) {
        Ok(changes) => changes,
        Err(err) => return err.into_response(),
    };

    match update_profile(&pool, identity.user_id, &changes).await {
        Ok(Some(user)) => Json(ProfileUpdateResponse {
            message: "Profile updated successfully".to_string(),
            user: user.to_response(),
        })
        .into_response(),
        Ok(None) => ApiError::NotFound("User not found").into_response(),
        Err(err) if is_unique_violation(&err) => {
            ApiError::Conflict("Email already in use").into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Keep the non-blank fields of `request`, validating the ones with a format.
fn profile_changes(request: &ProfileUpdateRequest) -> Result<ProfileChanges<'_>, ApiError> {
    let email = match non_blank(request.email.as_deref()) {
        Some(email) => {
            let email = normalize_email(email);
            if !valid_email(&email) {
                return Err(ApiError::BadRequest("Invalid email".to_string()));
            }
            Some(email)
        }
        None => None,
    };

    let gender = match non_blank(request.gender.as_deref()) {
        Some(gender) => Some(Gender::parse(gender).ok_or_else(|| {
            ApiError::BadRequest("Gender must be one of Male, Female, Other".to_string())
        })?),
        None => None,
    };

    let changes = ProfileChanges {
        name: non_blank(request.name.as_deref()),
        email,
        gender,
        phone_number: non_blank(request.phone_number.as_deref()),
    };

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_ignored() {
        let request = ProfileUpdateRequest {
            name: Some("  Ada ".to_string()),
            email: Some(String::new()),
            gender: Some("   ".to_string()),
            phone_number: None,
        };
        let changes = profile_changes(&request).unwrap();

        assert_eq!(changes.name, Some("Ada"));
        assert_eq!(changes.email, None);
        assert_eq!(changes.gender, None);
        assert_eq!(changes.phone_number, None);
    }

    #[test]
    fn empty_update_is_rejected() {
        let request = ProfileUpdateRequest {
            name: Some(" ".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(matches!(
            profile_changes(&request),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            profile_changes(&ProfileUpdateRequest::default()),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn email_is_normalized_and_validated() {
        let request = ProfileUpdateRequest {
            email: Some(" Ada@Example.COM ".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert_eq!(
            profile_changes(&request).unwrap().email.as_deref(),
            Some("ada@example.com")
        );

        let request = ProfileUpdateRequest {
            email: Some("not-an-email".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(matches!(
            profile_changes(&request),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn gender_must_be_known() {
        let request = ProfileUpdateRequest {
            gender: Some("Female".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert_eq!(profile_changes(&request).unwrap().gender, Some(Gender::Female));

        let request = ProfileUpdateRequest {
            gender: Some("female".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(matches!(
            profile_changes(&request),
            Err(ApiError::BadRequest(_))
        ));
    }
}
