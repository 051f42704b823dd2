use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CartItem, MenuItemSummary, RestaurantSummary};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    /// Admins may fill another user's cart; ignored for everyone else.
    pub user_id: Option<Uuid>,
    pub restaurant_id: Option<Uuid>,
    pub menu_item_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i32>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDetail {
    #[serde(flatten)]
    pub item: CartItem,
    pub menu_item: Option<MenuItemSummary>,
    pub restaurant: Option<RestaurantSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItemDetail>,
    /// Sum of price x quantity in minor units.
    pub total: i64,
}
