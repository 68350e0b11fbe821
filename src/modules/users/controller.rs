use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;
use zendriver_core::{AppError, ErrorResponse};
use zendriver_models::{
    AuthenticateResponse, LoginRequest, MessageResponse, RegisterRequest, Role,
    UpdateUserRequest, User, UserResponse,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::policy::{HasRole, owner_or_admin};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/users/sign-in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthenticateResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Username or password is incorrect", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all, fields(username = %dto.username))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthenticateResponse>, AppError> {
    let response = state.user_service.authenticate(dto).await?;
    Ok(Json(response))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/users/sign-up",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all, fields(username = %dto.username))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.user_service.register(dto).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.user_service.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(AuthUser(caller): AuthUser) -> Json<UserResponse> {
    Json(caller.user.into())
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _auth))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// Update a user
///
/// Allowed for the user themselves and for administrators. Changing the
/// role requires an administrator.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the owner or an administrator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, caller, dto), fields(caller_id = %caller.user_id()))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let target = state.user_service.get_by_id(id).await?;

    let mut policy = owner_or_admin::<User>();
    if dto.role.is_some_and(|role| role != target.role) {
        policy = policy.require(HasRole(Role::Admin));
    }
    policy.authorize(&caller, &target)?;

    let user = state.user_service.update(target, dto).await?;
    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the owner or an administrator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, caller), fields(caller_id = %caller.user_id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let target = state.user_service.get_by_id(id).await?;
    owner_or_admin::<User>().authorize(&caller, &target)?;

    state.user_service.delete(target).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
