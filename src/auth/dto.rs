use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{claims::Role, repo_types::User};
use crate::{dates, error::ApiError};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims and drops empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<String>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub role: Option<String>,
    pub company_code: Option<String>,
    pub profile_image: Option<String>,
}

/// Registration input after validation; the password is still plaintext.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: Option<Date>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub company_code: Option<String>,
    pub profile_image: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ApiError> {
        let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
            non_empty(self.email),
            self.password.filter(|p| !p.is_empty()),
            non_empty(self.first_name),
            non_empty(self.last_name),
        ) else {
            return Err(ApiError::validation("Required fields missing"));
        };

        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password too short"));
        }

        let role = match non_empty(self.role) {
            None => Role::Employee,
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| ApiError::validation(format!("Invalid role: {}", e.0)))?,
        };

        let birthdate = match non_empty(self.birthdate) {
            None => None,
            Some(raw) => Some(
                dates::parse_calendar_date(&raw)
                    .ok_or_else(|| ApiError::validation("Invalid birthdate"))?,
            ),
        };

        if matches!(self.age, Some(age) if age < 0) {
            return Err(ApiError::validation("Invalid age"));
        }

        Ok(Registration {
            email,
            password,
            role,
            first_name,
            last_name,
            birthdate,
            age: self.age,
            nationality: non_empty(self.nationality),
            company_code: non_empty(self.company_code),
            profile_image: non_empty(self.profile_image),
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalized email and the password.
    pub fn validate(self) -> Result<(String, String), ApiError> {
        match (non_empty(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
            _ => Err(ApiError::validation("Email and password are required")),
        }
    }
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "dates::iso_date::option")]
    pub birthdate: Option<Date>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub company_code: Option<String>,
    pub profile_image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            first_name: u.first_name,
            last_name: u.last_name,
            birthdate: u.birthdate,
            age: u.age,
            nationality: u.nationality,
            company_code: u.company_code,
            profile_image: u.profile_image,
            created_at: u.created_at,
        }
    }
}
