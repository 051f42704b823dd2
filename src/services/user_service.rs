use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::OrderDetail,
        restaurants::{ReviewQuery, ReviewWithRestaurant},
        users::{
            CreateAddressRequest, UpdateAddressRequest, UpdateUserRequest,
            UpdateUserStatusRequest, UserListQuery, UserOrdersQuery, UserStatus,
        },
    },
    entity::{Restaurants, Reviews, UserAddresses, Users, orders, reviews, user_addresses, users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{Address, User},
    response::{ApiResponse, Meta},
    services::order_service,
    state::AppState,
    validation::is_blank,
};

const DEFAULT_ADDRESS_TYPE: &str = "home";
const DEFAULT_COUNTRY: &str = "Ghana";

fn user_list_condition(query: &UserListQuery) -> Condition {
    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(users::Column::Role.eq(role.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(users::Column::FirstName).ilike(pattern.clone()))
                .add(Expr::col(users::Column::LastName).ilike(pattern.clone()))
                .add(Expr::col(users::Column::Email).ilike(pattern)),
        );
    }
    condition
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<Vec<User>>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize(20)?;

    let finder = Users::find().filter(user_list_condition(&query));
    let total = finder.clone().count(&state.orm).await? as i64;

    let data = finder
        .order_by_desc(users::Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users retrieved successfully",
        data,
        Some(Meta::new(page, limit, total)),
    ))
}

async fn load_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_owner_or_admin(user, Some(id))?;
    let found = load_user(state, id).await?;
    Ok(ApiResponse::success(
        "User retrieved successfully",
        found.into(),
        None,
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let mut active: users::ActiveModel = load_user(state, id).await?.into();
    let mut changed = false;

    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name);
        changed = true;
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
        changed = true;
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
        changed = true;
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
        changed = true;
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
        changed = true;
    }

    if !changed {
        return Err(AppError::BadRequest("No valid fields to update".into()));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated successfully",
        updated.into(),
        None,
    ))
}

pub fn parse_is_active(value: Option<&Value>) -> AppResult<bool> {
    value
        .and_then(Value::as_bool)
        .ok_or_else(|| AppError::BadRequest("is_active must be a boolean value".into()))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserStatusRequest,
) -> AppResult<ApiResponse<UserStatus>> {
    ensure_admin(user)?;
    let is_active = parse_is_active(payload.is_active.as_ref())?;

    let mut active: users::ActiveModel = load_user(state, id).await?.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        if is_active { "user_activate" } else { "user_deactivate" },
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    let message = if is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    Ok(ApiResponse::success(
        message,
        UserStatus {
            id: updated.id,
            email: updated.email,
            first_name: updated.first_name,
            last_name: updated.last_name,
            role: updated.role,
            is_active: updated.is_active,
        },
        None,
    ))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<Vec<Address>>> {
    ensure_owner_or_admin(user, Some(user_id))?;

    let data = UserAddresses::find()
        .filter(user_addresses::Column::UserId.eq(user_id))
        .order_by_desc(user_addresses::Column::IsDefault)
        .order_by_asc(user_addresses::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    Ok(ApiResponse::success(
        "Addresses retrieved successfully",
        data,
        None,
    ))
}

async fn clear_default(txn: &DatabaseTransaction, user_id: Uuid, keep: Option<Uuid>) -> AppResult<()> {
    let mut update = UserAddresses::update_many()
        .col_expr(user_addresses::Column::IsDefault, Expr::value(false))
        .filter(user_addresses::Column::UserId.eq(user_id))
        .filter(user_addresses::Column::IsDefault.eq(true));
    if let Some(id) = keep {
        update = update.filter(user_addresses::Column::Id.ne(id));
    }
    update.exec(txn).await?;
    Ok(())
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_owner_or_admin(user, Some(user_id))?;
    if is_blank(&payload.address_line1) || is_blank(&payload.city) {
        return Err(AppError::BadRequest(
            "Address line 1 and city are required".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    if payload.is_default {
        clear_default(&txn, user_id, None).await?;
    }

    let address = user_addresses::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        address_type: Set(payload
            .address_type
            .filter(|t| !is_blank(t))
            .unwrap_or_else(|| DEFAULT_ADDRESS_TYPE.to_string())),
        address_line1: Set(payload.address_line1.trim().to_string()),
        address_line2: Set(payload.address_line2),
        city: Set(payload.city.trim().to_string()),
        state: Set(payload.state),
        postal_code: Set(payload.postal_code),
        country: Set(payload
            .country
            .filter(|c| !is_blank(c))
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())),
        is_default: Set(payload.is_default),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address created successfully",
        address.into(),
        None,
    ))
}

async fn find_address(
    state: &AppState,
    user_id: Uuid,
    address_id: Uuid,
) -> AppResult<user_addresses::Model> {
    UserAddresses::find_by_id(address_id)
        .filter(user_addresses::Column::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Address"))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    address_id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_owner_or_admin(user, Some(user_id))?;
    let existing = find_address(state, user_id, address_id).await?;

    let mut active: user_addresses::ActiveModel = existing.into();
    let mut changed = false;

    if let Some(address_type) = payload.address_type {
        active.address_type = Set(address_type);
        changed = true;
    }
    if let Some(line1) = payload.address_line1 {
        if is_blank(&line1) {
            return Err(AppError::BadRequest("Address line 1 cannot be empty".into()));
        }
        active.address_line1 = Set(line1);
        changed = true;
    }
    if let Some(line2) = payload.address_line2 {
        active.address_line2 = Set(Some(line2));
        changed = true;
    }
    if let Some(city) = payload.city {
        if is_blank(&city) {
            return Err(AppError::BadRequest("City cannot be empty".into()));
        }
        active.city = Set(city);
        changed = true;
    }
    if let Some(region) = payload.state {
        active.state = Set(Some(region));
        changed = true;
    }
    if let Some(postal_code) = payload.postal_code {
        active.postal_code = Set(Some(postal_code));
        changed = true;
    }
    if let Some(country) = payload.country {
        active.country = Set(country);
        changed = true;
    }
    if let Some(is_default) = payload.is_default {
        active.is_default = Set(is_default);
        changed = true;
    }

    if !changed {
        return Err(AppError::BadRequest("No valid fields to update".into()));
    }

    let txn = state.orm.begin().await?;
    if payload.is_default == Some(true) {
        clear_default(&txn, user_id, Some(address_id)).await?;
    }
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address updated successfully",
        updated.into(),
        None,
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    address_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_owner_or_admin(user, Some(user_id))?;
    let existing = find_address(state, user_id, address_id).await?;
    existing.delete(&state.orm).await?;
    Ok(ApiResponse::message_only("Address deleted successfully"))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    query: UserOrdersQuery,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    ensure_owner_or_admin(user, Some(user_id))?;
    let (page, limit, offset) = query.pagination().normalize(10)?;

    let mut condition = Condition::all().add(orders::Column::UserId.eq(user_id));
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(orders::Column::Status.eq(status));
    }

    order_service::paginate(
        state,
        condition,
        page,
        limit,
        offset,
        "User orders retrieved successfully",
    )
    .await
}

pub async fn list_reviews(
    state: &AppState,
    user_id: Uuid,
    query: ReviewQuery,
) -> AppResult<ApiResponse<Vec<ReviewWithRestaurant>>> {
    let (page, limit, offset) = query.pagination().normalize(10)?;

    let finder = Reviews::find().filter(reviews::Column::UserId.eq(user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let data = finder
        .find_also_related(Restaurants)
        .order_by_desc(reviews::Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, restaurant)| ReviewWithRestaurant {
            review: review.into(),
            restaurant: restaurant.map(Into::into),
        })
        .collect();

    Ok(ApiResponse::success(
        "User reviews retrieved successfully",
        data,
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use sea_orm::{DbBackend, QueryTrait};
    use serde_json::json;

    #[test]
    fn is_active_must_be_boolean() {
        assert!(parse_is_active(Some(&json!(true))).unwrap());
        assert!(!parse_is_active(Some(&json!(false))).unwrap());
        assert!(parse_is_active(Some(&json!("true"))).is_err());
        assert!(parse_is_active(Some(&json!(1))).is_err());
        assert!(parse_is_active(None).is_err());
    }

    #[test]
    fn user_search_covers_names_and_email() {
        let query = UserListQuery {
            role: Some(Role::RestaurantOwner),
            search: Some("mensah".into()),
            ..Default::default()
        };
        let sql = Users::find()
            .filter(user_list_condition(&query))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""role" = 'restaurant_owner'"#));
        assert!(sql.contains(r#""first_name" ILIKE '%mensah%'"#));
        assert!(sql.contains(r#""last_name" ILIKE '%mensah%'"#));
        assert!(sql.contains(r#""email" ILIKE '%mensah%'"#));
    }
}
