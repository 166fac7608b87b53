/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse`, so HTTP handlers and the auth
 * middleware can return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 401
 * }
 * ```
 *
 * Server-side failures (5xx) are logged with their full text and answered
 * with a generic message so collaborator internals never reach the client.
 */

use axum::response::{IntoResponse, Json, Response};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("[Server] {}", self);
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
