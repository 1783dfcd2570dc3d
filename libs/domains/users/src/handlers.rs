//! HTTP handlers for account, session and profile endpoints

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuthSession, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::{UserError, UserResult};
use crate::models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileForm,
    ProfilePicture, ProfileResponse, ResetPasswordRequest, SignupRequest, SignupResponse,
    UpdateProfileResponse, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        signup,
        login,
        logout,
        forgot_password,
        reset_password,
        profile,
        details,
        delete_account,
        update_profile,
    ),
    components(
        schemas(
            SignupRequest, SignupResponse, LoginRequest, LoginResponse,
            ForgotPasswordRequest, ResetPasswordRequest, ProfileResponse,
            UserResponse, UpdateProfileResponse, UpdateProfileUpload, MessageResponse
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "Signup, sessions, password reset and profiles")
    )
)]
pub struct ApiDoc;

/// Account routes; `/logout` and `/user/*` sit behind the bearer middleware
pub fn router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    let jwt = service.jwt().clone();

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/user/profile", get(profile))
        .route("/user/Details", get(details))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{reset_token}", post(reset_password))
        .route("/user/delete/{user_id}", get(delete_account))
        .route("/updateProfile", post(update_profile))
        .merge(protected)
        .with_state(service)
}

/// Create an account and start a session
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created and session started", body = SignupResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn signup<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<SignupRequest>,
) -> UserResult<impl IntoResponse> {
    let signed_up = service.signup(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created and session started".to_string(),
            user: signed_up.user,
            token: signed_up.token,
            redirect_url: "/".to_string(),
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let logged_in = service.login(input).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: logged_in.token,
        username: logged_in.username,
    }))
}

/// End the presented session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Users",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn logout<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    session: AuthSession,
) -> UserResult<Json<MessageResponse>> {
    service.logout(&session).await?;
    Ok(Json(MessageResponse::new("Logout successful")))
}

/// Mail a password reset link
#[utoipa::path(
    post,
    path = "/forgot-password",
    tag = "Users",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Password reset email sent", body = MessageResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn forgot_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<ForgotPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    service.forgot_password(&input.email).await?;
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/reset-password/{reset_token}",
    tag = "Users",
    params(
        ("reset_token" = String, Path, description = "Token from the reset email")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successful", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reset_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(reset_token): Path<String>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    service.reset_password(&reset_token, input).await?;
    Ok(Json(MessageResponse::new("Password reset successful")))
}

/// Username and email of the session owner
#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "Users",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    session: AuthSession,
) -> UserResult<Json<ProfileResponse>> {
    Ok(Json(service.profile(&session).await?))
}

/// Full public record of the session owner
#[utoipa::path(
    get,
    path = "/user/Details",
    tag = "Users",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn details<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    session: AuthSession,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.details(&session).await?))
}

/// Delete an account.
///
/// Exposed as an unauthenticated GET for compatibility with existing clients.
/// Any caller who knows a user id can delete that account.
#[utoipa::path(
    get,
    path = "/user/delete/{user_id}",
    tag = "Users",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User account deleted successfully", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_account<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(user_id): UuidPath,
) -> UserResult<Json<MessageResponse>> {
    service.delete_account(user_id).await?;
    Ok(Json(MessageResponse::new("User account deleted successfully")))
}

/// Multipart body of `POST /updateProfile`, for documentation only
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UpdateProfileUpload {
    user_id: String,
    name: String,
    /// `YYYY-MM-DD`
    dob: String,
    #[schema(value_type = Option<String>, format = Binary)]
    profile_pic: Option<Vec<u8>>,
}

/// Set name, date of birth and optionally a profile picture
#[utoipa::path(
    post,
    path = "/updateProfile",
    tag = "Users",
    request_body(content = UpdateProfileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile updated successfully", body = UpdateProfileResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    mut multipart: Multipart,
) -> UserResult<Json<UpdateProfileResponse>> {
    let mut form = ProfileForm::default();
    let mut picture = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UserError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "profilePic" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UserError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    picture = Some(ProfilePicture {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "userId" | "name" | "dob" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| UserError::BadRequest(e.body_text()))?;
                match name.as_str() {
                    "userId" => form.user_id = value,
                    "name" => form.name = value,
                    _ => form.dob = value,
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let user = service.update_profile(form, picture).await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        user,
    }))
}
