//! SQL storage helpers for user records.

use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::types::{Gender, UserResponse};

const USER_COLUMNS: &str = "id, name, email, password_hash, phone_number, gender";

#[derive(Debug)]
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    name: String,
    email: String,
    pub(super) password_hash: String,
    phone_number: String,
    gender: Option<Gender>,
}

impl UserRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let gender: Option<String> = row.try_get("gender")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            phone_number: row.try_get("phone_number")?,
            gender: gender.as_deref().and_then(Gender::parse),
        })
    }

    /// Response view; drops the password hash.
    pub(super) fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            gender: self.gender,
        }
    }
}

/// Columns changed by a profile update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub(super) struct ProfileChanges<'a> {
    pub(super) name: Option<&'a str>,
    pub(super) email: Option<String>,
    pub(super) gender: Option<Gender>,
    pub(super) phone_number: Option<&'a str>,
}

impl ProfileChanges<'_> {
    pub(super) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.gender.is_none()
            && self.phone_number.is_none()
    }
}

/// Insert a user and return its id. A taken email surfaces as a unique violation.
pub(super) async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<Uuid, sqlx::Error> {
    let query = "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let id = Uuid::new_v4();
    sqlx::query(query)
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(id)
}

pub(super) async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.as_ref().map(UserRecord::from_row).transpose()
}

pub(super) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
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

    row.as_ref().map(UserRecord::from_row).transpose()
}

/// Apply `changes` and return the updated record, or `None` if the user is gone.
pub(super) async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    changes: &ProfileChanges<'_>,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let query = format!(
        "UPDATE users SET \
            name = COALESCE($2, name), \
            email = COALESCE($3, email), \
            gender = COALESCE($4, gender), \
            phone_number = COALESCE($5, phone_number) \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    );
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(id)
        .bind(changes.name)
        .bind(changes.email.as_deref())
        .bind(changes.gender.map(Gender::as_str))
        .bind(changes.phone_number)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    row.as_ref().map(UserRecord::from_row).transpose()
}
