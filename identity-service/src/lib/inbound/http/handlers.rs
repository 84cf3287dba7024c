use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::identity::errors::IdentityError;

pub mod health;
pub mod login;
pub mod signup;
pub mod username;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Errors surfaced at the HTTP boundary.
///
/// Each variant owns its response body shape; existing clients read the
/// `message`, `error` and `auth` keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400 `{"message": ...}`
    BadRequest(String),
    /// 400 `{"error": "Invalid Token"}`
    InvalidToken,
    /// 401 `{"error": ...}`
    Unauthorized(String),
    /// 401 `{"auth": false, "token": null, "message": ...}`
    InvalidCredentials,
    /// 500 `{"error": ...}`
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid Token" })),
            )
                .into_response(),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "auth": false,
                    "token": null,
                    "message": INVALID_CREDENTIALS_MESSAGE,
                })),
            )
                .into_response(),
            ApiError::InternalServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidInput(message) => ApiError::BadRequest(message),
            IdentityError::UsernameTaken(_) => {
                ApiError::BadRequest("Username already exists".to_string())
            }
            IdentityError::InvalidCredentials => ApiError::InvalidCredentials,
            IdentityError::Unauthenticated => ApiError::Unauthorized("Access Denied".to_string()),
            IdentityError::InvalidToken => ApiError::InvalidToken,
            IdentityError::StoreUnavailable(_) | IdentityError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}
