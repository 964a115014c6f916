//! User account handlers mounted under `/api/users`.

use crate::accounts::ProfileForm;
use crate::auth::middleware::AuthUser;
use crate::types::{
    AppError, AuthResponse, ImageUpload, LoginRequest, MessageResponse, Result, UserResponse,
    UsersResponse,
};
use crate::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

// ============= Multipart Form Schemas =============

/// Multipart body of `POST /api/users/register`.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
    /// `Male`, `Female` or `Other`; defaults to `Male`
    gender: Option<String>,
    age: u32,
    address: String,
    city: String,
    state: String,
    zip: String,
    #[schema(value_type = String, format = Binary)]
    image: String,
}

/// Multipart body of `PATCH /api/users/update`. Every field is optional.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
pub struct UpdateForm {
    name: Option<String>,
    email: Option<String>,
    gender: Option<String>,
    age: Option<u32>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    /// New password; re-hashed before storage
    password: Option<String>,
    /// Send `true` together with `image` to replace the profile image
    #[serde(rename = "imageUpdate")]
    image_update: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<String>,
}

// ============= Handlers =============

/// List every registered user
#[utoipa::path(
    get,
    path = "/api/users/all",
    responses(
        (status = 200, description = "Users found", body = UsersResponse)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state.accounts.list_users().await?;

    Ok(Json(UsersResponse {
        message: "Users found".to_string(),
        users,
    }))
}

/// Get a single user by id
#[utoipa::path(
    get,
    path = "/api/users/one/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state.accounts.get_user(&user_id).await?;

    Ok(Json(UserResponse {
        message: "User found".to_string(),
        user,
    }))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/current",
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Not authorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current_user(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        message: "User found".to_string(),
        user,
    })
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "User already exists or malformed body"),
        (status = 413, description = "Upload too large"),
        (status = 422, description = "Validation failed")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let multipart = multipart.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let registration = read_profile_form(multipart).await?.into_registration()?;

    let issued = state.accounts.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            id: issued.user_id,
            token: issued.token,
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "User logged in successfully", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let issued = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User logged in successfully".to_string(),
            id: issued.user_id,
            token: issued.token,
        }),
    ))
}

/// Update the authenticated user's profile
#[utoipa::path(
    patch,
    path = "/api/users/update",
    request_body(content = UpdateForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User details updated successfully", body = MessageResponse),
        (status = 400, description = "Email already taken or malformed body"),
        (status = 401, description = "Not authorized"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>> {
    let multipart = multipart.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let changes = read_profile_form(multipart).await?.into_changes()?;

    state.accounts.update_profile(&user.id, changes).await?;

    Ok(Json(MessageResponse::new("User details updated successfully")))
}

/// Delete the authenticated user's account
#[utoipa::path(
    delete,
    path = "/api/users/delete",
    responses(
        (status = 200, description = "User deleted successfully", body = MessageResponse),
        (status = 401, description = "Not authorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>> {
    state.accounts.delete_account(&user.id).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// ============= Multipart Helpers =============

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm> {
    let mut form = ProfileForm::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.set_image(ImageUpload {
                bytes,
                file_name,
                content_type,
            });
        } else if !name.is_empty() {
            let value = field.text().await.map_err(multipart_error)?;
            form.insert_field(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large".to_string())
    } else {
        AppError::InvalidInput(err.body_text())
    }
}
