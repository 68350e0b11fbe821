//! Uniform error responses.
//!
//! [`error_handler`] sits outside the routes and the panic catcher. It:
//!
//! - logs the cause of every internal error, and adds it to the body as
//!   `detail` when running in development
//! - rewrites error responses that are not JSON (framework rejections,
//!   405s, empty bodies) into an [`ErrorResponse`]
//!
//! [`handle_panic`] turns a panicking handler into an internal error so it
//! flows through the same path.

use std::any::Any;

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;
use zendriver_core::{AppError, ErrorKind, ErrorResponse, InternalErrorDetail};

use crate::state::AppState;

/// Largest rejection body read back when rebuilding an error response.
const MAX_REWRITE_BODY: usize = 16 * 1024;

pub async fn error_handler(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = next.run(req).await;

    if let Some(InternalErrorDetail(detail)) =
        response.extensions_mut().remove::<InternalErrorDetail>()
    {
        error!(
            method = %method,
            path = %path,
            status = %response.status(),
            error = %detail,
            "Unhandled error"
        );

        if state.config.server.environment.is_development() {
            let mut body = ErrorResponse::new(ErrorKind::Internal, "Internal server error");
            body.detail = Some(detail);
            return (response.status(), Json(body)).into_response();
        }

        return response;
    }

    let status = response.status();
    if (status.is_client_error() || status.is_server_error()) && !is_json(&response) {
        return rewrite(response).await;
    }

    response
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

async fn rewrite(response: Response) -> Response {
    let (parts, body) = response.into_parts();
    let status = parts.status;
    let kind = ErrorKind::from_status(status);

    let message = if kind == ErrorKind::Internal {
        "Internal server error".to_string()
    } else {
        let text = to_bytes(body, MAX_REWRITE_BODY)
            .await
            .ok()
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            text
        }
    };

    let mut rebuilt = (status, Json(ErrorResponse::new(kind, message))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }

    rebuilt
}

/// Response for a panicking handler, used with `CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal_error(format!("handler panicked: {}", detail)).into_response()
}

pub async fn not_found_fallback(uri: Uri) -> AppError {
    AppError::not_found(format!("No route for {}", uri.path()))
}
