use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    models::{
        MenuCategory, MenuItem, Restaurant, RestaurantImage, RestaurantSummary, Review,
        UserSummary,
    },
    routes::params::Pagination,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cuisine_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub opening_hours: Option<serde_json::Value>,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
}

/// Partial update; identity, ownership and timestamps are not accepted.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cuisine_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub opening_hours: Option<serde_json::Value>,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: MenuCategory,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantWithMenu {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menu_categories: Vec<CategoryWithItems>,
    pub restaurant_images: Vec<RestaurantImage>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewWithRestaurant {
    #[serde(flatten)]
    pub review: Review,
    pub restaurant: Option<RestaurantSummary>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
}

impl ReviewQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}
