use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    models::{MenuItemSummary, Order, OrderItem, OrderType, RestaurantSummary, UserSummary},
    pricing::OrderTotals,
    routes::params::Pagination,
};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
    pub status: Option<String>,
    /// Admins only; everyone else is scoped to their own orders.
    pub user_id: Option<Uuid>,
    /// Admins, or the owner of this restaurant.
    pub restaurant_id: Option<Uuid>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub restaurant_id: Option<Uuid>,
    #[serde(default)]
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub order_number: String,
    /// Amount due: subtotal + tax + delivery fee.
    pub total_amount: i64,
    pub totals: OrderTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub menu_item: Option<MenuItemSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub restaurant: Option<RestaurantSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<UserSummary>,
    pub order_items: Vec<OrderItemDetail>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}
