//! Resource-based authorization.
//!
//! A [`Policy`] is a list of [`AuthorizationHandler`]s that must all succeed
//! for a caller to act on a resource. Handlers compose:
//!
//! ```ignore
//! use crate::middleware::policy::{owner_or_admin, HasRole};
//!
//! // Owner or admin may edit; changing the role additionally needs admin.
//! let mut policy = owner_or_admin::<User>();
//! if dto.role.is_some() {
//!     policy = policy.require(HasRole(Role::Admin));
//! }
//! policy.authorize(&caller, &target)?;
//! ```

use tracing::debug;
use uuid::Uuid;
use zendriver_core::AppError;
use zendriver_models::{Role, User};

use crate::metrics::track_authorization_check;
use crate::middleware::auth::AuthContext;

/// A resource with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for User {
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

/// One authorization requirement over resources of type `R`.
pub trait AuthorizationHandler<R: ?Sized>: Send + Sync {
    fn name(&self) -> String;

    /// `Err` is a 403 to send back as is.
    fn handle(&self, caller: &AuthContext, resource: &R) -> Result<(), AppError>;
}

/// Caller holds the given role.
#[derive(Debug, Clone, Copy)]
pub struct HasRole(pub Role);

impl<R: ?Sized> AuthorizationHandler<R> for HasRole {
    fn name(&self) -> String {
        format!("role:{}", self.0)
    }

    fn handle(&self, caller: &AuthContext, _resource: &R) -> Result<(), AppError> {
        if caller.role() == self.0 {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Access denied. Required role: {}",
                self.0
            )))
        }
    }
}

/// Caller owns the resource.
#[derive(Debug, Clone, Copy)]
pub struct IsOwner;

impl<R: Owned + ?Sized> AuthorizationHandler<R> for IsOwner {
    fn name(&self) -> String {
        "owner".to_string()
    }

    fn handle(&self, caller: &AuthContext, resource: &R) -> Result<(), AppError> {
        if caller.user_id() == resource.owner_id() {
            Ok(())
        } else {
            Err(AppError::forbidden("Access denied. You do not own this resource"))
        }
    }
}

/// Succeeds when at least one inner handler does. An empty set never does.
pub struct AnyOf<R: ?Sized> {
    handlers: Vec<Box<dyn AuthorizationHandler<R>>>,
}

impl<R: ?Sized> AnyOf<R> {
    pub fn new(handlers: Vec<Box<dyn AuthorizationHandler<R>>>) -> Self {
        Self { handlers }
    }
}

impl<R: ?Sized> AuthorizationHandler<R> for AnyOf<R> {
    fn name(&self) -> String {
        let names: Vec<String> = self.handlers.iter().map(|h| h.name()).collect();
        format!("any_of({})", names.join(", "))
    }

    fn handle(&self, caller: &AuthContext, resource: &R) -> Result<(), AppError> {
        if self
            .handlers
            .iter()
            .any(|h| h.handle(caller, resource).is_ok())
        {
            return Ok(());
        }

        let names: Vec<String> = self.handlers.iter().map(|h| h.name()).collect();
        Err(AppError::forbidden(format!(
            "Access denied. Requires one of: {}",
            names.join(", ")
        )))
    }
}

pub struct Policy<R: ?Sized> {
    name: &'static str,
    handlers: Vec<Box<dyn AuthorizationHandler<R>>>,
}

impl<R: ?Sized> Policy<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn require(mut self, handler: impl AuthorizationHandler<R> + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Runs every handler in order and stops at the first denial.
    pub fn authorize(&self, caller: &AuthContext, resource: &R) -> Result<(), AppError> {
        for handler in &self.handlers {
            if let Err(e) = handler.handle(caller, resource) {
                debug!(
                    policy = self.name,
                    requirement = %handler.name(),
                    user_id = %caller.user_id(),
                    "authorization denied"
                );
                track_authorization_check(false, caller.role().as_str());
                return Err(e);
            }
        }

        track_authorization_check(true, caller.role().as_str());
        Ok(())
    }
}

/// The resource's owner or any administrator.
pub fn owner_or_admin<R: Owned + ?Sized + 'static>() -> Policy<R> {
    let handlers: Vec<Box<dyn AuthorizationHandler<R>>> =
        vec![Box::new(IsOwner), Box::new(HasRole(Role::Admin))];
    Policy::new("owner_or_admin").require(AnyOf::new(handlers))
}

pub fn admin_only<R: ?Sized + 'static>() -> Policy<R> {
    Policy::new("admin_only").require(HasRole(Role::Admin))
}
