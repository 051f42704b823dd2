use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::restaurants::{
        CategoryWithItems, CreateRestaurantRequest, CreateReviewRequest, RestaurantWithMenu,
        ReviewQuery, ReviewWithUser, UpdateRestaurantRequest,
    },
    entity::{
        MenuCategories, MenuItems, RestaurantDetails, RestaurantImages, Restaurants, Reviews,
        Users, menu_categories, menu_items, restaurant_details, restaurant_images, restaurants,
        reviews,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, check_restaurant_owner, require_restaurant_access, require_role},
    models::{Restaurant, RestaurantListing, Review, Role},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::is_blank,
};

pub async fn list_restaurants(state: &AppState) -> AppResult<ApiResponse<Vec<RestaurantListing>>> {
    let rows = RestaurantDetails::find()
        .order_by_asc(restaurant_details::Column::Name)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Restaurants retrieved successfully",
        rows.into_iter().map(RestaurantListing::from).collect(),
        None,
    ))
}

/// Active restaurants are public; an inactive one is only shown to its owner or an admin.
pub async fn get_restaurant(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<RestaurantWithMenu>> {
    let restaurant = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|r| r.is_active || viewer.is_some_and(|u| check_restaurant_owner(u, r).is_ok()))
        .ok_or_else(|| AppError::not_found("Restaurant"))?;

    let categories = MenuCategories::find()
        .filter(menu_categories::Column::RestaurantId.eq(id))
        .filter(menu_categories::Column::IsActive.eq(true))
        .order_by_asc(menu_categories::Column::DisplayOrder)
        .order_by_asc(menu_categories::Column::Name)
        .all(&state.orm)
        .await?;

    let items = MenuItems::find()
        .filter(menu_items::Column::RestaurantId.eq(id))
        .filter(menu_items::Column::IsAvailable.eq(true))
        .order_by_asc(menu_items::Column::Name)
        .all(&state.orm)
        .await?;

    let images = RestaurantImages::find()
        .filter(restaurant_images::Column::RestaurantId.eq(id))
        .order_by_asc(restaurant_images::Column::DisplayOrder)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Restaurant retrieved successfully",
        RestaurantWithMenu {
            restaurant: restaurant.into(),
            menu_categories: group_menu(categories, items),
            restaurant_images: images.into_iter().map(Into::into).collect(),
        },
        None,
    ))
}

fn group_menu(
    categories: Vec<menu_categories::Model>,
    items: Vec<menu_items::Model>,
) -> Vec<CategoryWithItems> {
    categories
        .into_iter()
        .map(|category| {
            let menu_items = items
                .iter()
                .filter(|item| item.category_id == category.id)
                .cloned()
                .map(Into::into)
                .collect();
            CategoryWithItems {
                category: category.into(),
                menu_items,
            }
        })
        .collect()
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    require_role(user, &[Role::RestaurantOwner, Role::Admin])?;

    if is_blank(&payload.name) || is_blank(&payload.description) || is_blank(&payload.cuisine_type)
    {
        return Err(AppError::BadRequest(
            "Name, description, and cuisine type are required".into(),
        ));
    }

    let restaurant = restaurants::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(Some(user.user_id)),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        cuisine_type: Set(payload.cuisine_type.trim().to_string()),
        address: Set(payload.address),
        phone: Set(payload.phone),
        whatsapp: Set(payload.whatsapp),
        email: Set(payload.email),
        opening_hours: Set(payload.opening_hours),
        logo_url: Set(payload.logo_url),
        hero_image_url: Set(payload.hero_image_url),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "restaurant_create",
        "restaurants",
        serde_json::json!({ "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Restaurant created successfully",
        restaurant.into(),
        None,
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let existing = require_restaurant_access(state, user, id).await?;
    let mut active: restaurants::ActiveModel = existing.into();
    let mut changed = false;

    if let Some(name) = payload.name {
        if is_blank(&name) {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        active.name = Set(name.trim().to_string());
        changed = true;
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
        changed = true;
    }
    if let Some(cuisine_type) = payload.cuisine_type {
        active.cuisine_type = Set(cuisine_type);
        changed = true;
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
        changed = true;
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
        changed = true;
    }
    if let Some(whatsapp) = payload.whatsapp {
        active.whatsapp = Set(Some(whatsapp));
        changed = true;
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
        changed = true;
    }
    if let Some(hours) = payload.opening_hours {
        active.opening_hours = Set(Some(hours));
        changed = true;
    }
    if let Some(logo_url) = payload.logo_url {
        active.logo_url = Set(Some(logo_url));
        changed = true;
    }
    if let Some(hero) = payload.hero_image_url {
        active.hero_image_url = Set(Some(hero));
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
        "restaurant_update",
        "restaurants",
        serde_json::json!({ "restaurant_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Restaurant updated successfully",
        updated.into(),
        None,
    ))
}

pub async fn deactivate_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let existing = require_restaurant_access(state, user, id).await?;
    let mut active: restaurants::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "restaurant_delete",
        "restaurants",
        serde_json::json!({ "restaurant_id": id }),
    )
    .await;

    Ok(ApiResponse::message_only("Restaurant deleted successfully"))
}

pub async fn list_reviews(
    state: &AppState,
    restaurant_id: Uuid,
    query: ReviewQuery,
) -> AppResult<ApiResponse<Vec<ReviewWithUser>>> {
    let (page, limit, offset) = query.pagination().normalize(10)?;

    let finder = Reviews::find().filter(reviews::Column::RestaurantId.eq(restaurant_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Users)
        .order_by_desc(reviews::Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let data = rows
        .into_iter()
        .map(|(review, user)| ReviewWithUser {
            review: review.into(),
            user: user.map(Into::into),
        })
        .collect();

    Ok(ApiResponse::success(
        "Reviews retrieved successfully",
        data,
        Some(Meta::new(page, limit, total)),
    ))
}

pub fn validate_rating(rating: Option<i16>) -> AppResult<i16> {
    match rating {
        Some(r) if (1..=5).contains(&r) => Ok(r),
        _ => Err(AppError::BadRequest(
            "Rating must be between 1 and 5".into(),
        )),
    }
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let rating = validate_rating(payload.rating)?;

    let exists = Restaurants::find()
        .filter(
            Condition::all()
                .add(restaurants::Column::Id.eq(restaurant_id))
                .add(restaurants::Column::IsActive.eq(true)),
        )
        .count(&state.orm)
        .await?;
    if exists == 0 {
        return Err(AppError::not_found("Restaurant"));
    }

    let review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        restaurant_id: Set(restaurant_id),
        rating: Set(rating),
        comment: Set(payload.comment.filter(|c| !is_blank(c))),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Review created successfully",
        review.into(),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(restaurant_id: Uuid, name: &str, order: i32) -> menu_categories::Model {
        menu_categories::Model {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.into(),
            description: None,
            display_order: order,
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn item(category: &menu_categories::Model, name: &str) -> menu_items::Model {
        let now = Utc::now().fixed_offset();
        menu_items::Model {
            id: Uuid::new_v4(),
            restaurant_id: category.restaurant_id,
            category_id: category.id,
            name: name.into(),
            description: None,
            price: 4500,
            currency: "GHS".into(),
            image_url: None,
            is_vegetarian: false,
            is_vegan: false,
            is_gluten_free: false,
            preparation_time: Some(20),
            calories: None,
            allergens: serde_json::json!([]),
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn menu_items_are_grouped_under_their_category() {
        let restaurant_id = Uuid::new_v4();
        let mains = category(restaurant_id, "Mains", 0);
        let drinks = category(restaurant_id, "Drinks", 1);
        let items = vec![
            item(&mains, "Jollof Rice"),
            item(&drinks, "Sobolo"),
            item(&mains, "Waakye"),
        ];

        let grouped = group_menu(vec![mains, drinks], items);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].category.name, "Mains");
        let names: Vec<_> = grouped[0].menu_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Jollof Rice", "Waakye"]);
        assert_eq!(grouped[1].menu_items.len(), 1);
    }

    #[test]
    fn empty_category_keeps_an_empty_item_list() {
        let grouped = group_menu(vec![category(Uuid::new_v4(), "Desserts", 3)], vec![]);
        assert!(grouped[0].menu_items.is_empty());
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert_eq!(validate_rating(Some(1)).unwrap(), 1);
        assert_eq!(validate_rating(Some(5)).unwrap(), 5);
        assert!(validate_rating(Some(0)).is_err());
        assert!(validate_rating(Some(6)).is_err());
        assert!(validate_rating(None).is_err());
    }
}
