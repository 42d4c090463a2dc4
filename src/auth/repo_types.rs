use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::claims::Role;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: Option<Date>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub company_code: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Validated registration data, ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: Option<Date>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub company_code: Option<String>,
    pub profile_image: Option<String>,
}
