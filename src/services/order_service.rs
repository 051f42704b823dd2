use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, CreatedOrder, OrderDetail, OrderItemDetail, OrderListQuery,
        UpdateOrderStatusRequest,
    },
    entity::{
        CartItems, MenuItems, OrderItems, Orders, Restaurants, Users, cart_items, menu_items,
        order_items, orders, restaurants,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus, Role},
    pricing::{PricingRules, line_total, price_order},
    response::{ApiResponse, Meta},
    state::AppState,
};

const ESTIMATED_DELIVERY_MINUTES: i64 = 45;
const ORDER_NUMBER_SUFFIX_LEN: usize = 9;
const ORDER_NUMBER_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `ORD-<unix millis>-<9 uppercase alphanumerics>`.
///
/// The suffix is `seed` written in base 36, least significant digit first.
/// Nine digits only reach the low 47 bits, which are random in a v4 UUID.
pub fn build_order_number(now_millis: i64, seed: Uuid) -> String {
    let mut rest = seed.as_u128();
    let mut suffix = String::with_capacity(ORDER_NUMBER_SUFFIX_LEN);
    for _ in 0..ORDER_NUMBER_SUFFIX_LEN {
        suffix.push(char::from(ORDER_NUMBER_ALPHABET[(rest % 36) as usize]));
        rest /= 36;
    }
    format!("ORD-{now_millis}-{suffix}")
}

/// Who may move an order to `next`.
///
/// Admins and the owner of the order's restaurant may set any status. The
/// customer who placed the order may only cancel it while it is pending.
pub fn check_status_change(
    user: &AuthUser,
    order: &orders::Model,
    restaurant_owner: Option<Uuid>,
    next: OrderStatus,
) -> AppResult<()> {
    if user.is_admin() {
        return Ok(());
    }
    if user.role == Role::RestaurantOwner && restaurant_owner == Some(user.user_id) {
        return Ok(());
    }
    if order.user_id != user.user_id {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    if next != OrderStatus::Cancelled {
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }
    if order.status != OrderStatus::Pending.as_str() {
        return Err(AppError::BadRequest(
            "Only pending orders can be cancelled".into(),
        ));
    }
    Ok(())
}

/// Attach restaurant summaries and line items (with menu item summaries) to orders.
pub(crate) async fn with_details(
    state: &AppState,
    rows: Vec<(orders::Model, Option<restaurants::Model>)>,
) -> AppResult<Vec<OrderDetail>> {
    let ids: Vec<Uuid> = rows.iter().map(|(order, _)| order.id).collect();
    let mut lines = load_lines(state, ids).await?;

    Ok(rows
        .into_iter()
        .map(|(order, restaurant)| OrderDetail {
            order_items: lines.remove(&order.id).unwrap_or_default(),
            order: order.into(),
            restaurant: restaurant.map(Into::into),
            customer: None,
        })
        .collect())
}

async fn load_lines(
    state: &AppState,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<OrderItemDetail>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderItems::find()
        .filter(order_items::Column::OrderId.is_in(order_ids))
        .find_also_related(MenuItems)
        .order_by_asc(order_items::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::new();
    for (item, menu_item) in rows {
        grouped.entry(item.order_id).or_default().push(OrderItemDetail {
            item: item.into(),
            menu_item: menu_item.map(Into::into),
        });
    }
    Ok(grouped)
}

async fn owns_restaurant(state: &AppState, user: &AuthUser, restaurant_id: Uuid) -> AppResult<bool> {
    if user.role != Role::RestaurantOwner {
        return Ok(false);
    }
    let owned = Restaurants::find()
        .filter(
            Condition::all()
                .add(restaurants::Column::Id.eq(restaurant_id))
                .add(restaurants::Column::OwnerId.eq(user.user_id)),
        )
        .count(&state.orm)
        .await?;
    Ok(owned > 0)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let (page, limit, offset) = query.pagination().normalize(10)?;
    let mut condition = Condition::all();

    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(orders::Column::Status.eq(status));
    }

    let restaurant_wide = match query.restaurant_id {
        Some(restaurant_id) => {
            condition = condition.add(orders::Column::RestaurantId.eq(restaurant_id));
            user.is_admin() || owns_restaurant(state, user, restaurant_id).await?
        }
        None => false,
    };

    if user.is_admin() {
        if let Some(user_id) = query.user_id {
            condition = condition.add(orders::Column::UserId.eq(user_id));
        }
    } else if !restaurant_wide {
        condition = condition.add(orders::Column::UserId.eq(user.user_id));
    }

    paginate(state, condition, page, limit, offset, "Orders retrieved successfully").await
}

/// Shared by the order list and the per-user order history.
pub(crate) async fn paginate(
    state: &AppState,
    condition: Condition,
    page: i64,
    limit: i64,
    offset: i64,
    message: &str,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let finder = Orders::find().filter(condition);
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Restaurants)
        .order_by_desc(orders::Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let data = with_details(state, rows).await?;
    Ok(ApiResponse::success(
        message,
        data,
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let (order, restaurant) = Orders::find_by_id(id)
        .find_also_related(Restaurants)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let is_owner = restaurant
        .as_ref()
        .is_some_and(|r| user.role == Role::RestaurantOwner && r.owner_id == Some(user.user_id));
    if !(user.is_admin() || is_owner || order.user_id == user.user_id) {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    let customer = Users::find_by_id(order.user_id).one(&state.orm).await?;
    let mut lines = load_lines(state, vec![order.id]).await?;

    Ok(ApiResponse::success(
        "Order retrieved successfully",
        OrderDetail {
            order_items: lines.remove(&order.id).unwrap_or_default(),
            order: order.into(),
            restaurant: restaurant.map(Into::into),
            customer: customer.map(Into::into),
        },
        None,
    ))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreatedOrder>> {
    let Some(restaurant_id) = payload.restaurant_id.filter(|_| !payload.items.is_empty()) else {
        return Err(AppError::BadRequest(
            "Restaurant ID and order items are required".into(),
        ));
    };
    if payload.items.iter().any(|line| line.quantity < 1) {
        return Err(AppError::BadRequest(
            "Item quantity must be at least 1".into(),
        ));
    }

    let restaurant = Restaurants::find_by_id(restaurant_id)
        .filter(restaurants::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant"))?;

    let ids: Vec<Uuid> = payload.items.iter().map(|line| line.menu_item_id).collect();
    let menu: HashMap<Uuid, menu_items::Model> = MenuItems::find()
        .filter(menu_items::Column::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut priced = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let item = menu
            .get(&line.menu_item_id)
            .filter(|item| item.is_available && item.restaurant_id == restaurant.id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Menu item {} is not available from this restaurant",
                    line.menu_item_id
                ))
            })?;
        priced.push((item.price, line.quantity));
    }

    let rules = PricingRules {
        tax_rate_bps: state.config.tax_rate_bps,
        delivery_fee: state.config.delivery_fee,
    };
    let too_large = || AppError::BadRequest("Order total is too large".into());
    let totals = price_order(&priced, payload.order_type, rules).ok_or_else(too_large)?;

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let order_number = build_order_number(now.timestamp_millis(), Uuid::new_v4());

    let txn = state.orm.begin().await?;

    let order = orders::ActiveModel {
        id: Set(order_id),
        user_id: Set(user.user_id),
        restaurant_id: Set(restaurant.id),
        order_number: Set(order_number.clone()),
        order_type: Set(payload.order_type.as_str().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total_amount: Set(totals.subtotal),
        tax_amount: Set(totals.tax_amount),
        delivery_fee: Set(totals.delivery_fee),
        final_amount: Set(totals.final_amount),
        delivery_address: Set(payload.delivery_address),
        delivery_instructions: Set(payload.delivery_instructions),
        notes: Set(payload.notes),
        estimated_delivery_time: Set(Some(
            (now + Duration::minutes(ESTIMATED_DELIVERY_MINUTES)).into(),
        )),
        actual_delivery_time: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(payload.items.len());
    for (line, (unit_price, quantity)) in payload.items.into_iter().zip(priced) {
        let item = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            total_price: Set(line_total(unit_price, quantity).ok_or_else(too_large)?),
            special_instructions: Set(line.special_instructions),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item.into());
    }

    CartItems::delete_many()
        .filter(cart_items::Column::UserId.eq(user.user_id))
        .filter(cart_items::Column::RestaurantId.eq(restaurant.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, %order_number, final_amount = totals.final_amount, "order placed");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "order_number": order_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created successfully",
        CreatedOrder {
            order: order.into(),
            items,
            order_number,
            total_amount: totals.final_amount,
            totals,
        },
        None,
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let raw = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is required".into()))?;
    let next = OrderStatus::parse(raw).ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;

    let (order, restaurant) = Orders::find_by_id(id)
        .find_also_related(Restaurants)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    check_status_change(user, &order, restaurant.and_then(|r| r.owner_id), next)?;

    let previous = order.status.clone();
    let now = Utc::now();
    let mut active: orders::ActiveModel = order.into();
    active.status = Set(next.as_str().to_string());
    if next == OrderStatus::Delivered {
        active.actual_delivery_time = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": updated.id, "from": previous, "to": next.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated successfully",
        updated.into(),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "kofi@example.com".into(),
            role,
        }
    }

    fn order(user_id: Uuid, status: OrderStatus) -> orders::Model {
        let now = Utc::now().fixed_offset();
        orders::Model {
            id: Uuid::new_v4(),
            user_id,
            restaurant_id: Uuid::new_v4(),
            order_number: "ORD-1-ABCDEF123".into(),
            order_type: "delivery".into(),
            status: status.as_str().into(),
            total_amount: 6000,
            tax_amount: 750,
            delivery_fee: 500,
            final_amount: 7250,
            delivery_address: Some("12 Oxford St, Osu".into()),
            delivery_instructions: None,
            notes: None,
            estimated_delivery_time: None,
            actual_delivery_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn order_number_format() {
        let seed = Uuid::parse_str("0f3c9a7e-55b1-4d2a-9c1e-1234567890ab").unwrap();
        let number = build_order_number(1_700_000_000_123, seed);
        assert_eq!(number, "ORD-1700000000123-VF39FY6IP");

        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn order_number_suffix_uses_letters_past_f() {
        let seed = Uuid::parse_str("00000000-0000-4000-8000-000000000023").unwrap();
        assert_eq!(build_order_number(1, seed), "ORD-1-ZSLRDBA2J");

        let seen: std::collections::HashSet<char> = (0..200)
            .flat_map(|_| {
                let number = build_order_number(0, Uuid::new_v4());
                number.rsplit('-').next().unwrap().chars().collect::<Vec<_>>()
            })
            .collect();
        assert!(seen.iter().any(|c| ('G'..='Z').contains(c)));
    }

    #[test]
    fn admin_and_restaurant_owner_may_set_any_status() {
        let customer = Uuid::new_v4();
        let placed = order(customer, OrderStatus::Preparing);

        let admin = user(Role::Admin);
        assert!(check_status_change(&admin, &placed, None, OrderStatus::Ready).is_ok());

        let owner = user(Role::RestaurantOwner);
        assert!(
            check_status_change(&owner, &placed, Some(owner.user_id), OrderStatus::Delivered)
                .is_ok()
        );
        let other_owner = user(Role::RestaurantOwner);
        assert!(matches!(
            check_status_change(&other_owner, &placed, Some(owner.user_id), OrderStatus::Ready),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn customer_may_only_cancel_own_pending_order() {
        let customer = user(Role::Customer);
        let pending = order(customer.user_id, OrderStatus::Pending);

        assert!(check_status_change(&customer, &pending, None, OrderStatus::Cancelled).is_ok());
        assert!(matches!(
            check_status_change(&customer, &pending, None, OrderStatus::Confirmed),
            Err(AppError::Forbidden(_))
        ));

        let preparing = order(customer.user_id, OrderStatus::Preparing);
        assert!(matches!(
            check_status_change(&customer, &preparing, None, OrderStatus::Cancelled),
            Err(AppError::BadRequest(_))
        ));

        let someone_else = order(Uuid::new_v4(), OrderStatus::Pending);
        assert!(matches!(
            check_status_change(&customer, &someone_else, None, OrderStatus::Cancelled),
            Err(AppError::Forbidden(_))
        ));
    }
}
