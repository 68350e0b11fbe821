use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::users::controller::{
    delete_user, get_me, get_user, get_users, sign_in, sign_up, update_user,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/me", get(get_me))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
