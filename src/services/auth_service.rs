use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{
        AuthPayload, ChangePasswordRequest, Claims, ForgotPasswordRequest,
        ForgotPasswordResponse, LoginRequest, RegisterRequest, ResetPasswordRequest, TokenKind,
        UpdateProfileRequest,
    },
    entity::{Users, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::ApiResponse,
    state::AppState,
    validation::{check_password, is_blank, is_valid_email},
};

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const RESET_TOKEN_TTL_HOURS: i64 = 1;
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    role: &str,
    kind: TokenKind,
    ttl: Duration,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        kind,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn access_token(state: &AppState, user: &users::Model) -> AppResult<String> {
    issue_token(
        &state.config.jwt_secret,
        user.id,
        &user.email,
        &user.role,
        TokenKind::Access,
        Duration::days(state.config.jwt_expires_in_days),
    )
}

async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<users::Model>> {
    Ok(Users::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.orm)
        .await?)
}

async fn load_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthPayload>> {
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
        phone,
        role,
    } = payload;

    if is_blank(&email) || is_blank(&password) || is_blank(&first_name) || is_blank(&last_name) {
        return Err(AppError::BadRequest(
            "Email, password, first name, and last name are required".into(),
        ));
    }
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }
    check_password(&password, "Password")?;

    let role = role.unwrap_or(Role::Customer);
    if role == Role::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".into(),
        ));
    }

    if find_by_email(state, &email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
    }

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        phone: Set(phone.filter(|p| !is_blank(p))),
        role: Set(role.as_str().to_string()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    // A concurrent registration can win the race past the lookup above.
    .map_err(|err| AppError::conflict_on_duplicate(err, DUPLICATE_EMAIL))?;

    let token = access_token(state, &user)?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthPayload {
            user: user.into(),
            token,
        },
        None,
    ))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthPayload>> {
    let LoginRequest { email, password } = payload;
    if is_blank(&email) || is_blank(&password) {
        return Err(AppError::BadRequest(
            "Email and password are required".into(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let user = find_by_email(state, &email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".into()));
    }
    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = access_token(state, &user)?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Login successful",
        AuthPayload {
            user: user.into(),
            token,
        },
        None,
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let profile = load_user(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "Profile retrieved successfully",
        profile.into(),
        None,
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    if is_blank(&payload.first_name) || is_blank(&payload.last_name) {
        return Err(AppError::BadRequest(
            "First name and last name are required".into(),
        ));
    }

    let mut active: users::ActiveModel = load_user(state, user.user_id).await?.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.phone = Set(payload.phone.filter(|p| !is_blank(p)));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        updated.into(),
        None,
    ))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<()>> {
    if is_blank(&payload.current_password) || is_blank(&payload.new_password) {
        return Err(AppError::BadRequest(
            "Current password and new password are required".into(),
        ));
    }
    check_password(&payload.new_password, "New password")?;

    let account = load_user(state, user.user_id).await?;
    if !verify_password(&payload.current_password, &account.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let mut active: users::ActiveModel = account.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "password_change",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::message_only("Password changed successfully"))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ForgotPasswordResponse>> {
    if is_blank(&payload.email) {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    let mut reset_token = None;
    if let Some(user) = find_by_email(state, &payload.email.trim().to_lowercase()).await? {
        let token = issue_token(
            &state.config.jwt_secret,
            user.id,
            &user.email,
            &user.role,
            TokenKind::PasswordReset,
            Duration::hours(RESET_TOKEN_TTL_HOURS),
        )?;
        tracing::info!(user_id = %user.id, "password reset token issued");
        audit::record(
            &state.orm,
            Some(user.id),
            "password_reset_requested",
            "users",
            serde_json::json!({ "user_id": user.id }),
        )
        .await;
        if state.config.expose_reset_token {
            reset_token = Some(token);
        }
    }

    Ok(ApiResponse::success(
        FORGOT_PASSWORD_MESSAGE,
        ForgotPasswordResponse { reset_token },
        None,
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    if is_blank(&payload.reset_token) || is_blank(&payload.new_password) {
        return Err(AppError::BadRequest(
            "Reset token and new password are required".into(),
        ));
    }
    check_password(&payload.new_password, "New password")?;

    let invalid = || AppError::BadRequest("Invalid reset token".into());
    let claims = decode_token(&state.config.jwt_secret, payload.reset_token.trim()).map_err(
        |err| match err {
            TokenError::Expired => AppError::BadRequest("Reset token has expired".into()),
            TokenError::Invalid => invalid(),
        },
    )?;
    if claims.kind != TokenKind::PasswordReset {
        return Err(invalid());
    }
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| invalid())?;

    let account = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    let mut active: users::ActiveModel = account.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::message_only("Password reset successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn access_token_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_token(
            SECRET,
            id,
            "ama@example.com",
            "customer",
            TokenKind::Access,
            Duration::days(7),
        )
        .unwrap();

        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "ama@example.com");
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn expired_token_is_reported() {
        let token = issue_token(
            SECRET,
            Uuid::new_v4(),
            "ama@example.com",
            "customer",
            TokenKind::PasswordReset,
            Duration::hours(-2),
        )
        .unwrap();
        assert_eq!(decode_token(SECRET, &token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn wrong_secret_or_garbage_is_invalid() {
        let token = issue_token(
            SECRET,
            Uuid::new_v4(),
            "ama@example.com",
            "admin",
            TokenKind::Access,
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(
            decode_token("another-secret", &token).unwrap_err(),
            TokenError::Invalid
        );
        assert_eq!(decode_token(SECRET, "not-a-jwt").unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong-pass", &hash).unwrap());
        assert!(verify_password("s3cret-pass", "not-a-phc-string").is_err());
    }
}
