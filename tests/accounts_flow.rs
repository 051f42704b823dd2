mod common;

use restaurant_hub_api::{
    dto::{
        auth::{
            ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
            ResetPasswordRequest, UpdateProfileRequest,
        },
        users::{CreateAddressRequest, UpdateUserStatusRequest, UserListQuery},
    },
    error::AppError,
    models::Role,
    services::{auth_service, user_service},
};
use serde_json::json;

// Registration, login, password reset and the admin user controls.
#[tokio::test]
async fn account_lifecycle_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let customer = common::register(&state, "Efua@Example.com", Role::Customer).await?;
    assert_eq!(customer.email, "efua@example.com");

    let duplicate = auth_service::register(
        &state,
        RegisterRequest {
            email: "efua@example.com".into(),
            password: "another1".into(),
            first_name: "Efua".into(),
            last_name: "Sutherland".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Simultaneous sign-ups for one address: one wins, the other gets 409, never a 500.
    let (first, second) = tokio::join!(
        auth_service::register(&state, signup("kofi@example.com")),
        auth_service::register(&state, signup("kofi@example.com")),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict(msg)) if msg == "User with this email already exists"))
    );

    let wrong = auth_service::login(&state, login("efua@example.com", "wrong-pass")).await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    let session = auth_service::login(&state, login("EFUA@example.com", "secret123"))
        .await?
        .data
        .expect("session");
    assert_eq!(session.user.id, customer.user_id);
    assert!(!session.token.is_empty());

    let profile = auth_service::update_profile(
        &state,
        &customer,
        UpdateProfileRequest {
            first_name: "Efua".into(),
            last_name: "Sutherland".into(),
            phone: Some("+233244000111".into()),
        },
    )
    .await?
    .data
    .expect("profile");
    assert_eq!(profile.first_name, "Efua");
    assert_eq!(profile.phone.as_deref(), Some("+233244000111"));

    let bad_change = auth_service::change_password(
        &state,
        &customer,
        ChangePasswordRequest {
            current_password: "not-it".into(),
            new_password: "newsecret".into(),
        },
    )
    .await;
    assert!(matches!(bad_change, Err(AppError::BadRequest(_))));

    auth_service::change_password(
        &state,
        &customer,
        ChangePasswordRequest {
            current_password: "secret123".into(),
            new_password: "newsecret".into(),
        },
    )
    .await?;
    auth_service::login(&state, login("efua@example.com", "newsecret")).await?;

    // Unknown addresses get the same answer as known ones, minus the token.
    let unknown = auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await?;
    let known = auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: "efua@example.com".into(),
        },
    )
    .await?;
    assert_eq!(unknown.message, known.message);
    assert!(unknown.data.expect("payload").reset_token.is_none());
    let reset_token = known
        .data
        .and_then(|d| d.reset_token)
        .expect("reset token exposed in tests");

    let forged = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            reset_token: session.token.clone(),
            new_password: "resetpass".into(),
        },
    )
    .await;
    assert!(matches!(forged, Err(AppError::BadRequest(_))));

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            reset_token,
            new_password: "resetpass".into(),
        },
    )
    .await?;
    auth_service::login(&state, login("efua@example.com", "resetpass")).await?;

    // Only one default address at a time.
    let home = user_service::create_address(
        &state,
        &customer,
        customer.user_id,
        address("12 Ring Road", true),
    )
    .await?
    .data
    .expect("address");
    let work = user_service::create_address(
        &state,
        &customer,
        customer.user_id,
        address("3 Independence Ave", true),
    )
    .await?
    .data
    .expect("address");
    let addresses = user_service::list_addresses(&state, &customer, customer.user_id)
        .await?
        .data
        .expect("addresses");
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].id, work.id);
    assert!(addresses[0].is_default);
    assert!(addresses.iter().any(|a| a.id == home.id && !a.is_default));

    let admin = common::create_admin(&state, "admin@example.com").await?;

    let not_admin = user_service::list_users(&state, &customer, UserListQuery::default()).await;
    assert!(matches!(not_admin, Err(AppError::Forbidden(_))));

    let found = user_service::list_users(
        &state,
        &admin,
        UserListQuery {
            search: Some("sutherland".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(found.pagination.expect("pagination").total, 1);

    let not_bool = user_service::update_status(
        &state,
        &admin,
        customer.user_id,
        UpdateUserStatusRequest {
            is_active: Some(json!("false")),
        },
    )
    .await;
    assert!(matches!(not_bool, Err(AppError::BadRequest(_))));

    user_service::update_status(
        &state,
        &admin,
        customer.user_id,
        UpdateUserStatusRequest {
            is_active: Some(json!(false)),
        },
    )
    .await?;
    let locked_out = auth_service::login(&state, login("efua@example.com", "resetpass")).await;
    assert!(matches!(locked_out, Err(AppError::Unauthorized(_))));

    Ok(())
}

fn signup(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.into(),
        password: "secret123".into(),
        first_name: "Kofi".into(),
        last_name: "Annan".into(),
        ..Default::default()
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

fn address(line1: &str, is_default: bool) -> CreateAddressRequest {
    CreateAddressRequest {
        address_line1: line1.into(),
        city: "Accra".into(),
        is_default,
        ..Default::default()
    }
}
