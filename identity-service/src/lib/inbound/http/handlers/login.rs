use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::identity::models::LoginCommand;
use crate::identity::models::Password;
use crate::identity::models::Username;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), "Login body rejected");
        ApiError::InvalidCredentials
    })?;

    // A blank username or password is reported exactly like a wrong password.
    let command = body.try_into_command().ok_or(ApiError::InvalidCredentials)?;

    state
        .identity_service
        .authenticate(command)
        .await
        .map_err(ApiError::from)
        .map(|issued| {
            ApiSuccess::new(
                StatusCode::OK,
                LoginResponseData {
                    auth: true,
                    token: issued.token,
                },
            )
        })
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

impl LoginRequest {
    fn try_into_command(self) -> Option<LoginCommand> {
        let username = Username::for_lookup(self.username).ok()?;
        let password = Password::new(self.password).ok()?;
        Some(LoginCommand::new(username, password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub auth: bool,
    pub token: String,
}
