use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::TokenKind,
    entity::{Restaurants, Users, restaurants},
    error::{AppError, AppResult},
    models::Role,
    services::auth_service::{TokenError, decode_token},
    state::AppState,
};

/// Caller identity, re-read from the database on every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Like [`AuthUser`], but requests without a usable token proceed anonymously.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

pub fn require_role(user: &AuthUser, roles: &[Role]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    require_role(user, &[Role::Admin])
}

/// Admins pass; everyone else must own the resource.
pub fn ensure_owner_or_admin(user: &AuthUser, owner_id: Option<Uuid>) -> Result<(), AppError> {
    if user.is_admin() || owner_id == Some(user.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Access denied - you can only modify your own resources".into(),
    ))
}

/// Admins and the owning restaurant owner pass. Returns the restaurant row.
pub async fn require_restaurant_access(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
) -> AppResult<restaurants::Model> {
    if user.role == Role::Customer {
        return Err(AppError::Forbidden(
            "Insufficient permissions - restaurant access required".into(),
        ));
    }

    let restaurant = Restaurants::find_by_id(restaurant_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant"))?;

    check_restaurant_owner(user, &restaurant)?;
    Ok(restaurant)
}

pub fn check_restaurant_owner(
    user: &AuthUser,
    restaurant: &restaurants::Model,
) -> Result<(), AppError> {
    if user.is_admin() || restaurant.owner_id == Some(user.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Access denied - you can only modify your own restaurants".into(),
    ))
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

async fn authenticate(parts: &Parts, state: &AppState) -> AppResult<AuthUser> {
    let token = bearer_token(&parts.headers)
        .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

    let claims = decode_token(&state.config.jwt_secret, token).map_err(|err| match err {
        TokenError::Expired => AppError::Unauthorized("Token expired".into()),
        TokenError::Invalid => AppError::Unauthorized("Invalid token".into()),
    })?;
    if claims.kind != TokenKind::Access {
        return Err(AppError::Unauthorized("Invalid token".into()));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token - user not found".into()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".into()));
    }

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: Role::parse(&user.role).unwrap_or(Role::Customer),
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(OptionalAuthUser(None));
        }
        match authenticate(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(err) => {
                tracing::debug!(error = %err, "optional auth: ignoring token");
                Ok(OptionalAuthUser(None))
            }
        }
    }
}
