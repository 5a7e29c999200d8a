use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{api::state::AppState, error::AppError};

/// Claims minted by the identity provider. The booking core trusts a
/// verified token and does not re-derive identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

fn user_from_request(state: &AppState, request: &Request) -> Option<CurrentUser> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let id = Uuid::parse_str(&data.claims.sub).ok()?;
    Some(CurrentUser {
        id,
        role: data.claims.role,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = user_from_request(&state, &request).ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = user_from_request(&state, &request).ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Guest flows stay open; a valid bearer token, when present, attaches
/// the caller's identity for the handler to use.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = user_from_request(&state, &request) {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}
