use chrono::{DateTime, NaiveDate, Utc};
use database::mongodb::ids::{uuid_as_string, uuid_vec_as_string};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Capital letter followed by one or more letters or digits
static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]+$").unwrap());

static HAS_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn has_uppercase(value: &str) -> Result<(), ValidationError> {
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new("uppercase"));
    }
    Ok(())
}

fn valid_date(value: &str) -> Result<(), ValidationError> {
    parse_dob(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("date"))
}

/// `YYYY-MM-DD`
pub fn parse_dob(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Stored account document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", with = "uuid_as_string")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(rename = "password")]
    pub password_hash: String,
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Session tokens that have not been logged out
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_expires: Option<DateTime<Utc>>,
    #[serde(default, with = "uuid_vec_as_string")]
    pub orders: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: SignupRequest, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: input.username,
            email: input.email,
            password_hash,
            phone: input.phone,
            name: None,
            dob: None,
            profile_pic: None,
            tokens: Vec::new(),
            reset_password_token: None,
            reset_password_expires: None,
            orders: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of an account; never carries the hash, tokens or reset fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub profile_pic: Option<String>,
    pub orders: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            name: user.name,
            dob: user.dob,
            profile_pic: user.profile_pic,
            orders: user.orders,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(
        custom(function = "required", message = "Username is required"),
        length(min = 3, message = "Username must be at least 3 characters long"),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username must start with a capital letter and contain only letters and numbers"
        )
    )]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        regex(path = *HAS_DIGIT, message = "Password must contain at least one number"),
        custom(function = "has_uppercase", message = "Password must contain at least one uppercase letter")
    )]
    pub password: String,
    #[serde(default)]
    #[validate(regex(path = *PHONE_PATTERN, message = "Phone number must be exactly 10 digits"))]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        regex(path = *HAS_DIGIT, message = "Password must contain at least one number"),
        custom(function = "has_uppercase", message = "Password must contain at least one uppercase letter")
    )]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Text fields of the `updateProfile` multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileForm {
    pub user_id: String,
    #[validate(custom(function = "required", message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "valid_date", message = "Date of birth must be a valid date"))]
    pub dob: String,
}

/// Uploaded `profilePic` part
#[derive(Debug, Clone)]
pub struct ProfilePicture {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fields written by a profile update
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileChanges {
    pub name: String,
    pub dob: NaiveDate,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Plain `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
