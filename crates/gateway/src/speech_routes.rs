//! `/generate` and `/api/voices` handlers.

use {
    axum::{
        Json,
        body::Body,
        extract::{State, rejection::JsonRejection},
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    },
    tracing::debug,
    voxrelay_voice::{RelayError, SpeechRequest},
};

use crate::server::AppState;

/// Clean the text, relay it to the provider, and stream the audio back.
///
/// The response body is a live stream: dropping the connection drops the
/// upstream request.
pub async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "malformed generate request");
            return error_json(StatusCode::BAD_REQUEST, rejection.body_text());
        },
    };

    match state.relay.handle(request).await {
        Ok(audio) => (
            [(header::CONTENT_TYPE, audio.content_type)],
            Body::from_stream(audio.chunks),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// List the voice table as `[{"key": ..., "voice": ...}]`, sorted by key.
pub async fn voices_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.relay.voices().entries())
}

/// HTTP rendering of a [`RelayError`].
pub struct ApiError(pub RelayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            RelayError::Validation(message) => error_json(StatusCode::BAD_REQUEST, message),
            RelayError::Upstream {
                status,
                content_type,
                body,
            } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let mut response = (status, body).into_response();
                match content_type.and_then(|ct| ct.parse().ok()) {
                    Some(ct) => {
                        response.headers_mut().insert(header::CONTENT_TYPE, ct);
                    },
                    None => {
                        response.headers_mut().remove(header::CONTENT_TYPE);
                    },
                }
                response
            },
            RelayError::Transport(message) => {
                error_json(StatusCode::INTERNAL_SERVER_ERROR, message)
            },
        }
    }
}

fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
