use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use zendriver_auth::JwtHandler;
use zendriver_core::{AppError, hash_password_with_cost, verify_password};
use zendriver_models::{
    AuthenticateResponse, LoginRequest, RegisterRequest, Role, UpdateUserRequest, User,
};

use crate::metrics::{
    track_jwt_issued, track_user_created, track_user_deleted, track_user_login_failure,
    track_user_login_success,
};
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Username or password is incorrect";

/// Checked against on unknown usernames; it never matches a real account.
const DUMMY_PASSWORD: &str = "zendriver-dummy-password";

/// User account use cases: sign-in, registration and management.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtHandler>,
    bcrypt_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtHandler>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            jwt,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Checks credentials and issues an access token.
    ///
    /// Unknown usernames and wrong passwords produce the same error, and both
    /// run one bcrypt verification at the configured cost.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn authenticate(
        &self,
        request: LoginRequest,
    ) -> Result<AuthenticateResponse, AppError> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            let dummy = self.dummy_hash().await?.to_owned();
            self.verify(request.password, dummy).await?;
            track_user_login_failure("unknown_user");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.verify(request.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "failed login attempt");
            track_user_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let issued = self.jwt.issue(&user)?;
        track_jwt_issued();
        track_user_login_success(user.role.as_str());

        info!(user_id = %user.id, "user signed in");
        Ok(AuthenticateResponse::new(user, issued.token, issued.expires_at))
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list().await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))
    }

    /// Self-registration; the account always gets [`Role::User`].
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        self.create(request, Role::User).await
    }

    /// Creates an account with an explicit role. Used by the `create-admin`
    /// command; never reachable over HTTP with a role other than `User`.
    #[instrument(skip(self, request), fields(username = %request.username, role = %role))]
    pub async fn create(&self, request: RegisterRequest, role: Role) -> Result<User, AppError> {
        if self.users.exists_by_username(&request.username).await? {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }

        let password_hash = self.hash(request.password).await?;
        let user = User::new(
            request.username,
            password_hash,
            request.first_name,
            request.last_name,
            role,
        );

        // A concurrent registration can still win between the check above
        // and this insert; the store rejects it as a duplicate.
        self.users.add(&user).await?;
        track_user_created(role.as_str());

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Applies the present fields of `request` to `user` and persists them.
    /// Authorization is the caller's job.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        mut user: User,
        request: UpdateUserRequest,
    ) -> Result<User, AppError> {
        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(password) = request.password {
            user.password_hash = self.hash(password).await?;
        }
        user.updated_at = Utc::now();

        self.users.update(&user).await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete(&self, user: User) -> Result<(), AppError> {
        self.users.remove(&user).await?;
        track_user_deleted();
        info!("user deleted");
        Ok(())
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(AppError::internal)?
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(AppError::internal)?
    }
}
