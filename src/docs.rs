use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use zendriver_core::{ErrorKind, ErrorResponse};
use zendriver_models::{
    AuthenticateResponse, LoginRequest, MessageResponse, RegisterRequest, Role,
    UpdateUserRequest, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::sign_in,
        crate::modules::users::controller::sign_up,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
    ),
    components(
        schemas(
            LoginRequest,
            AuthenticateResponse,
            RegisterRequest,
            UpdateUserRequest,
            UserResponse,
            Role,
            MessageResponse,
            ErrorResponse,
            ErrorKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Authentication and user management")
    ),
    info(
        title = "ZenDriver API",
        version = "0.1.0",
        description = "User accounts and JWT bearer authentication for ZenDriver.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
