use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartItemDetail, CartView, UpdateCartItemRequest},
    entity::{CartItems, MenuItems, Restaurants, cart_items, menu_items, restaurants},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{AuthUser, ensure_owner_or_admin},
    models::CartItem,
    pricing::line_total,
    response::ApiResponse,
    state::AppState,
};

/// Σ price × quantity over lines whose menu item is still known.
pub fn cart_total(items: &[CartItemDetail]) -> i64 {
    items
        .iter()
        .filter_map(|line| {
            let price = line.menu_item.as_ref()?.price;
            line_total(price, line.item.quantity)
        })
        .fold(0i64, |acc, amount| acc.saturating_add(amount))
}

pub async fn get_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    ensure_owner_or_admin(user, Some(user_id))?;

    let rows = CartItems::find()
        .filter(cart_items::Column::UserId.eq(user_id))
        .find_also_related(MenuItems)
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let restaurant_ids: Vec<Uuid> = rows.iter().map(|(item, _)| item.restaurant_id).collect();
    let restaurants: HashMap<Uuid, restaurants::Model> = if restaurant_ids.is_empty() {
        HashMap::new()
    } else {
        Restaurants::find()
            .filter(restaurants::Column::Id.is_in(restaurant_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    };

    let items: Vec<CartItemDetail> = rows
        .into_iter()
        .map(|(item, menu_item)| CartItemDetail {
            restaurant: restaurants.get(&item.restaurant_id).cloned().map(Into::into),
            item: item.into(),
            menu_item: menu_item.map(Into::into),
        })
        .collect();
    let total = cart_total(&items);

    Ok(ApiResponse::success(
        "Cart retrieved successfully",
        CartView { items, total },
        None,
    ))
}

/// Returns 201 for a new line and 200 when an existing line was incremented.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<(StatusCode, ApiResponse<CartItem>)> {
    let (Some(restaurant_id), Some(menu_item_id)) = (payload.restaurant_id, payload.menu_item_id)
    else {
        return Err(AppError::BadRequest(
            "Restaurant ID and menu item ID are required".into(),
        ));
    };
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let owner_id = match payload.user_id {
        Some(id) if user.is_admin() => id,
        _ => user.user_id,
    };

    let available = MenuItems::find_by_id(menu_item_id)
        .filter(menu_items::Column::RestaurantId.eq(restaurant_id))
        .filter(menu_items::Column::IsAvailable.eq(true))
        .one(&state.orm)
        .await?;
    if available.is_none() {
        return Err(AppError::not_found("Menu item"));
    }

    if let Some(line) = find_line(state, owner_id, restaurant_id, menu_item_id).await? {
        let updated = bump_line(state, line, quantity, payload.special_instructions).await?;
        return Ok((
            StatusCode::OK,
            ApiResponse::success("Cart item updated successfully", updated.into(), None),
        ));
    }

    let inserted = cart_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner_id),
        restaurant_id: Set(restaurant_id),
        menu_item_id: Set(menu_item_id),
        quantity: Set(quantity),
        special_instructions: Set(payload.special_instructions.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    match inserted {
        Ok(created) => Ok((
            StatusCode::CREATED,
            ApiResponse::success("Item added to cart successfully", created.into(), None),
        )),
        // Another request inserted the same line first; add to it instead.
        Err(err) if is_unique_violation(&err) => {
            let line = find_line(state, owner_id, restaurant_id, menu_item_id)
                .await?
                .ok_or(AppError::OrmError(err))?;
            let updated = bump_line(state, line, quantity, payload.special_instructions).await?;
            Ok((
                StatusCode::OK,
                ApiResponse::success("Cart item updated successfully", updated.into(), None),
            ))
        }
        Err(err) => Err(err.into()),
    }
}

async fn find_line(
    state: &AppState,
    user_id: Uuid,
    restaurant_id: Uuid,
    menu_item_id: Uuid,
) -> AppResult<Option<cart_items::Model>> {
    let line = CartItems::find()
        .filter(
            Condition::all()
                .add(cart_items::Column::UserId.eq(user_id))
                .add(cart_items::Column::RestaurantId.eq(restaurant_id))
                .add(cart_items::Column::MenuItemId.eq(menu_item_id)),
        )
        .one(&state.orm)
        .await?;
    Ok(line)
}

async fn bump_line(
    state: &AppState,
    line: cart_items::Model,
    quantity: i32,
    special_instructions: Option<String>,
) -> AppResult<cart_items::Model> {
    let new_quantity = line.quantity.saturating_add(quantity);
    let mut active: cart_items::ActiveModel = line.into();
    active.quantity = Set(new_quantity);
    if special_instructions.is_some() {
        active.special_instructions = Set(special_instructions);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(&state.orm).await?)
}

async fn load_line(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<cart_items::Model> {
    let line = CartItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))?;
    ensure_owner_or_admin(user, Some(line.user_id))?;
    Ok(line)
}

/// A quantity of zero or less removes the line; the response then carries no data.
pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let Some(quantity) = payload.quantity else {
        return Err(AppError::BadRequest("Quantity is required".into()));
    };
    let line = load_line(state, user, id).await?;

    if quantity <= 0 {
        line.delete(&state.orm).await?;
        return Ok(ApiResponse::message_only("Item removed from cart"));
    }

    let mut active: cart_items::ActiveModel = line.into();
    active.quantity = Set(quantity);
    if payload.special_instructions.is_some() {
        active.special_instructions = Set(payload.special_instructions);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Cart item updated successfully",
        updated.into(),
        None,
    ))
}

pub async fn remove_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let line = load_line(state, user, id).await?;
    line.delete(&state.orm).await?;
    Ok(ApiResponse::message_only("Item removed from cart"))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_owner_or_admin(user, Some(user_id))?;

    let result = CartItems::delete_many()
        .filter(cart_items::Column::UserId.eq(user_id))
        .exec(&state.orm)
        .await?;
    tracing::debug!(%user_id, removed = result.rows_affected, "cart cleared");

    Ok(ApiResponse::message_only("Cart cleared successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MenuItemSummary;

    fn line(price: Option<i64>, quantity: i32) -> CartItemDetail {
        let now = Utc::now();
        CartItemDetail {
            item: CartItem {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                restaurant_id: Uuid::new_v4(),
                menu_item_id: Uuid::new_v4(),
                quantity,
                special_instructions: None,
                created_at: now,
                updated_at: now,
            },
            menu_item: price.map(|price| MenuItemSummary {
                id: Uuid::new_v4(),
                name: "Kelewele".into(),
                description: None,
                price,
                currency: "GHS".into(),
                image_url: None,
                preparation_time: None,
            }),
            restaurant: None,
        }
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let items = vec![line(Some(1500), 2), line(Some(800), 3)];
        assert_eq!(cart_total(&items), 5400);
    }

    #[test]
    fn lines_without_menu_item_are_skipped() {
        let items = vec![line(None, 4), line(Some(1000), 1)];
        assert_eq!(cart_total(&items), 1000);
        assert_eq!(cart_total(&[]), 0);
    }
}
