#![allow(dead_code)]

use restaurant_hub_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::auth::RegisterRequest,
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service::{self, hash_password},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Database URL for flow tests; `None` skips them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    sqlx::query(
        "TRUNCATE TABLE audit_logs, reviews, user_addresses, cart_items, order_items, orders, \
         menu_items, menu_categories, restaurant_images, restaurants, users CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(AppState::new(pool, AppConfig::for_tests(database_url)))
}

/// Register through the public flow and return the caller identity.
pub async fn register(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register(
        state,
        RegisterRequest {
            email: email.to_string(),
            password: "secret123".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            phone: None,
            role: Some(role),
        },
    )
    .await?;
    let user = resp.data.expect("registered user").user;
    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role,
    })
}

/// Admins cannot self-register, so they are inserted directly.
pub async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password("admin123")?),
        first_name: Set("Hub".into()),
        last_name: Set("Admin".into()),
        phone: Set(None),
        role: Set(Role::Admin.as_str().to_string()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: Role::Admin,
    })
}
