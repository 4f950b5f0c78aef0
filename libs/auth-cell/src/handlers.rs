use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::typed_header::{TypedHeader, TypedHeaderRejection};
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::auth::{Principal, TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::state::AuthState;

type BearerHeader = Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>;

fn bearer(header: BearerHeader) -> Result<String, AppError> {
    let TypedHeader(Authorization(bearer)) = header.map_err(|rejection| {
        if rejection.is_missing() {
            AppError::Auth("Missing authorization header".to_string())
        } else {
            AppError::Auth("Invalid authorization header format".to_string())
        }
    })?;

    Ok(bearer.token().to_string())
}

#[axum::debug_handler]
pub async fn validate_token(
    State(state): State<AuthState>,
    header: BearerHeader,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = bearer(header)?;
    let user = jwt::validate_token(&token, &state.config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Never fails: an absent or bad token simply reports `valid: false`.
#[axum::debug_handler]
pub async fn verify_token(
    State(state): State<AuthState>,
    header: BearerHeader,
) -> Json<Value> {
    debug!("Verifying token");

    let valid = bearer(header)
        .ok()
        .map(|token| jwt::validate_token(&token, &state.config.supabase_jwt_secret).is_ok())
        .unwrap_or(false);

    Json(json!({ "valid": valid }))
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let principal = Principal::from(&user);
    debug!("Resolving profile for user: {}", principal.id);

    let profile = state.profiles.resolve(&principal).await?;

    Ok(Json(json!({
        "user_id": principal.id,
        "email": user.email,
        "role": principal.role,
        "profile": profile
    })))
}
