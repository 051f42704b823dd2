use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::menu::{
        CategoryQuery, CreateCategoryRequest, CreateMenuItemRequest, MenuItemDetail,
        MenuItemQuery, UpdateCategoryRequest, UpdateMenuItemRequest,
    },
    entity::{
        MenuCategories, MenuItems, MenuItemsView, Restaurants, menu_categories, menu_items,
        menu_items_view,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, require_restaurant_access},
    models::{MenuCategory, MenuItem, MenuItemListing},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::is_blank,
};

const DEFAULT_CURRENCY: &str = "GHS";

fn listing_condition(query: &MenuItemQuery) -> Condition {
    let mut condition = Condition::all().add(menu_items_view::Column::IsAvailable.eq(true));

    if let Some(restaurant_id) = query.restaurant_id {
        condition = condition.add(menu_items_view::Column::RestaurantId.eq(restaurant_id));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(menu_items_view::Column::CategoryId.eq(category_id));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(menu_items_view::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(menu_items_view::Column::Description).ilike(pattern)),
        );
    }
    if let Some(min) = query.min_price {
        condition = condition.add(menu_items_view::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        condition = condition.add(menu_items_view::Column::Price.lte(max));
    }
    if query.is_vegetarian == Some(true) {
        condition = condition.add(menu_items_view::Column::IsVegetarian.eq(true));
    }
    if query.is_vegan == Some(true) {
        condition = condition.add(menu_items_view::Column::IsVegan.eq(true));
    }
    if query.is_gluten_free == Some(true) {
        condition = condition.add(menu_items_view::Column::IsGlutenFree.eq(true));
    }
    condition
}

pub async fn list_items(
    state: &AppState,
    query: MenuItemQuery,
) -> AppResult<ApiResponse<Vec<MenuItemListing>>> {
    let (page, limit, offset) = query.pagination().normalize(20)?;

    let finder = MenuItemsView::find().filter(listing_condition(&query));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_asc(menu_items_view::Column::Name)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItemListing::from)
        .collect();

    Ok(ApiResponse::success(
        "Menu items retrieved successfully",
        items,
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItemDetail>> {
    let item = MenuItems::find_by_id(id)
        .filter(menu_items::Column::IsAvailable.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Menu item"))?;

    let category = MenuCategories::find_by_id(item.category_id)
        .one(&state.orm)
        .await?;
    let restaurant = Restaurants::find_by_id(item.restaurant_id)
        .one(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Menu item retrieved successfully",
        MenuItemDetail {
            item: item.into(),
            menu_category: category.map(Into::into),
            restaurant: restaurant.map(Into::into),
        },
        None,
    ))
}

async fn ensure_category_in_restaurant(
    state: &AppState,
    category_id: Uuid,
    restaurant_id: Uuid,
) -> AppResult<()> {
    let found = MenuCategories::find()
        .filter(
            Condition::all()
                .add(menu_categories::Column::Id.eq(category_id))
                .add(menu_categories::Column::RestaurantId.eq(restaurant_id)),
        )
        .count(&state.orm)
        .await?;
    if found == 0 {
        return Err(AppError::BadRequest(
            "Category does not belong to this restaurant".into(),
        ));
    }
    Ok(())
}

pub fn validate_price(price: Option<i64>) -> AppResult<i64> {
    match price {
        Some(p) if p > 0 => Ok(p),
        Some(_) => Err(AppError::BadRequest("Price must be greater than 0".into())),
        None => Err(AppError::BadRequest("Price is required".into())),
    }
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let (Some(restaurant_id), Some(category_id)) = (payload.restaurant_id, payload.category_id)
    else {
        return Err(AppError::BadRequest(
            "Restaurant ID, category ID, name, and price are required".into(),
        ));
    };
    if is_blank(&payload.name) || payload.price.is_none() {
        return Err(AppError::BadRequest(
            "Restaurant ID, category ID, name, and price are required".into(),
        ));
    }
    let price = validate_price(payload.price)?;

    require_restaurant_access(state, user, restaurant_id).await?;
    ensure_category_in_restaurant(state, category_id, restaurant_id).await?;

    let item = menu_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        category_id: Set(category_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(price),
        currency: Set(payload
            .currency
            .filter(|c| !is_blank(c))
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
        image_url: Set(payload.image_url),
        is_vegetarian: Set(payload.is_vegetarian),
        is_vegan: Set(payload.is_vegan),
        is_gluten_free: Set(payload.is_gluten_free),
        preparation_time: Set(payload.preparation_time),
        calories: Set(payload.calories),
        allergens: Set(serde_json::json!(payload.allergens)),
        is_available: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "menu_item_create",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id, "restaurant_id": restaurant_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu item created successfully",
        item.into(),
        None,
    ))
}

async fn load_item(state: &AppState, id: Uuid) -> AppResult<menu_items::Model> {
    MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Menu item"))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let existing = load_item(state, id).await?;
    require_restaurant_access(state, user, existing.restaurant_id).await?;

    if let Some(category_id) = payload.category_id {
        ensure_category_in_restaurant(state, category_id, existing.restaurant_id).await?;
    }

    let mut active: menu_items::ActiveModel = existing.into();
    let mut changed = false;

    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
        changed = true;
    }
    if let Some(name) = payload.name {
        if is_blank(&name) {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        active.name = Set(name.trim().to_string());
        changed = true;
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
        changed = true;
    }
    if payload.price.is_some() {
        active.price = Set(validate_price(payload.price)?);
        changed = true;
    }
    if let Some(currency) = payload.currency {
        active.currency = Set(currency);
        changed = true;
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
        changed = true;
    }
    if let Some(flag) = payload.is_vegetarian {
        active.is_vegetarian = Set(flag);
        changed = true;
    }
    if let Some(flag) = payload.is_vegan {
        active.is_vegan = Set(flag);
        changed = true;
    }
    if let Some(flag) = payload.is_gluten_free {
        active.is_gluten_free = Set(flag);
        changed = true;
    }
    if let Some(minutes) = payload.preparation_time {
        active.preparation_time = Set(Some(minutes));
        changed = true;
    }
    if let Some(calories) = payload.calories {
        active.calories = Set(Some(calories));
        changed = true;
    }
    if let Some(allergens) = payload.allergens {
        active.allergens = Set(serde_json::json!(allergens));
        changed = true;
    }
    if let Some(available) = payload.is_available {
        active.is_available = Set(available);
        changed = true;
    }

    if !changed {
        return Err(AppError::BadRequest("No valid fields to update".into()));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Menu item updated successfully",
        updated.into(),
        None,
    ))
}

pub async fn delete_item(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    let existing = load_item(state, id).await?;
    require_restaurant_access(state, user, existing.restaurant_id).await?;

    let mut active: menu_items::ActiveModel = existing.into();
    active.is_available = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "menu_item_delete",
        "menu_items",
        serde_json::json!({ "menu_item_id": id }),
    )
    .await;

    Ok(ApiResponse::message_only("Menu item deleted successfully"))
}

pub async fn list_categories(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<Vec<MenuCategory>>> {
    let mut finder = MenuCategories::find().filter(menu_categories::Column::IsActive.eq(true));
    if let Some(restaurant_id) = query.restaurant_id {
        finder = finder.filter(menu_categories::Column::RestaurantId.eq(restaurant_id));
    }

    let categories = finder
        .order_by_asc(menu_categories::Column::DisplayOrder)
        .order_by_asc(menu_categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuCategory::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories retrieved successfully",
        categories,
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<MenuCategory>> {
    let Some(restaurant_id) = payload.restaurant_id.filter(|_| !is_blank(&payload.name)) else {
        return Err(AppError::BadRequest(
            "Restaurant ID and name are required".into(),
        ));
    };
    require_restaurant_access(state, user, restaurant_id).await?;

    let category = menu_categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        display_order: Set(payload.display_order.unwrap_or(0)),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created successfully",
        category.into(),
        None,
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<MenuCategory>> {
    let existing = MenuCategories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    require_restaurant_access(state, user, existing.restaurant_id).await?;

    let mut active: menu_categories::ActiveModel = existing.into();
    let mut changed = false;

    if let Some(name) = payload.name {
        if is_blank(&name) {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        active.name = Set(name.trim().to_string());
        changed = true;
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
        changed = true;
    }
    if let Some(order) = payload.display_order {
        active.display_order = Set(order);
        changed = true;
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
        changed = true;
    }

    if !changed {
        return Err(AppError::BadRequest("No valid fields to update".into()));
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Category updated successfully",
        updated.into(),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql_for(query: &MenuItemQuery) -> String {
        MenuItemsView::find()
            .filter(listing_condition(query))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn listing_only_shows_available_items() {
        let sql = sql_for(&MenuItemQuery::default());
        assert!(sql.contains(r#""menu_items_view"."is_available" = TRUE"#));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn search_matches_name_or_description() {
        let query = MenuItemQuery {
            search: Some("  jollof ".into()),
            ..Default::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains(r#""name" ILIKE '%jollof%'"#));
        assert!(sql.contains(r#""description" ILIKE '%jollof%'"#));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn dietary_flags_filter_only_when_true() {
        let query = MenuItemQuery {
            is_vegan: Some(false),
            is_vegetarian: Some(true),
            min_price: Some(1000),
            max_price: Some(5000),
            ..Default::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains(r#""is_vegetarian" = TRUE"#));
        assert!(!sql.contains("is_vegan"));
        assert!(sql.contains(r#""price" >= 1000"#));
        assert!(sql.contains(r#""price" <= 5000"#));
    }

    #[test]
    fn price_must_be_positive() {
        assert_eq!(validate_price(Some(2500)).unwrap(), 2500);
        assert!(validate_price(Some(0)).is_err());
        assert!(validate_price(Some(-10)).is_err());
        assert_eq!(
            validate_price(None).unwrap_err().to_string(),
            "Price is required"
        );
    }
}
