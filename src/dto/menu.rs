use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    models::{MenuCategory, MenuItem, RestaurantSummary},
    routes::params::Pagination,
};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuItemQuery {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
    pub restaurant_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

impl MenuItemQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemDetail {
    #[serde(flatten)]
    pub item: MenuItem,
    pub menu_category: Option<MenuCategory>,
    pub restaurant: Option<RestaurantSummary>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub restaurant_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    pub preparation_time: Option<i32>,
    pub calories: Option<i32>,
    #[serde(default)]
    pub allergens: Vec<String>,
}

/// Partial update; the owning restaurant cannot be changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_gluten_free: Option<bool>,
    pub preparation_time: Option<i32>,
    pub calories: Option<i32>,
    pub allergens: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub restaurant_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}
