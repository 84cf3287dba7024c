use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::identity::models::AuthenticatedIdentity;

/// Echo the username carried by the caller's token.
pub async fn username(
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<ApiSuccess<UsernameResponseData>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        UsernameResponseData {
            username: identity.username,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsernameResponseData {
    pub username: String,
}
