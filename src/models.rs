use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items, menu_categories, menu_items, menu_items_view, order_items, orders,
    restaurant_details, restaurant_images, restaurants, reviews, user_addresses, users,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    RestaurantOwner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::RestaurantOwner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::RestaurantOwner => "restaurant_owner",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Delivery,
    Pickup,
    DineIn,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "delivery",
            OrderType::Pickup => "pickup",
            OrderType::DineIn => "dine_in",
        }
    }
}

/// Account data returned to clients; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl From<users::Model> for UserSummary {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub cuisine_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub opening_hours: Option<serde_json::Value>,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<restaurants::Model> for Restaurant {
    fn from(model: restaurants::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            cuisine_type: model.cuisine_type,
            address: model.address,
            phone: model.phone,
            whatsapp: model.whatsapp,
            email: model.email,
            opening_hours: model.opening_hours,
            logo_url: model.logo_url,
            hero_image_url: model.hero_image_url,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
}

impl From<restaurants::Model> for RestaurantSummary {
    fn from(model: restaurants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            whatsapp: model.whatsapp,
            address: model.address,
        }
    }
}

/// Row of the `restaurant_details` listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantListing {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub cuisine_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<restaurant_details::Model> for RestaurantListing {
    fn from(model: restaurant_details::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            cuisine_type: model.cuisine_type,
            address: model.address,
            phone: model.phone,
            whatsapp: model.whatsapp,
            email: model.email,
            logo_url: model.logo_url,
            hero_image_url: model.hero_image_url,
            average_rating: model.average_rating,
            review_count: model.review_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestaurantImage {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_hero: bool,
}

impl From<restaurant_images::Model> for RestaurantImage {
    fn from(model: restaurant_images::Model) -> Self {
        Self {
            id: model.id,
            image_url: model.image_url,
            alt_text: model.alt_text,
            display_order: model.display_order,
            is_hero: model.is_hero,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuCategory {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<menu_categories::Model> for MenuCategory {
    fn from(model: menu_categories::Model) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            display_order: model.display_order,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minor units.
    pub price: i64,
    pub currency: String,
    pub image_url: Option<String>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub preparation_time: Option<i32>,
    pub calories: Option<i32>,
    pub allergens: Vec<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<menu_items::Model> for MenuItem {
    fn from(model: menu_items::Model) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            currency: model.currency,
            image_url: model.image_url,
            is_vegetarian: model.is_vegetarian,
            is_vegan: model.is_vegan,
            is_gluten_free: model.is_gluten_free,
            preparation_time: model.preparation_time,
            calories: model.calories,
            allergens: allergens_from_json(model.allergens),
            is_available: model.is_available,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Row of the `menu_items_view` listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItemListing {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub image_url: Option<String>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub preparation_time: Option<i32>,
    pub calories: Option<i32>,
    pub allergens: Vec<String>,
    pub category_name: String,
    pub restaurant_name: String,
}

impl From<menu_items_view::Model> for MenuItemListing {
    fn from(model: menu_items_view::Model) -> Self {
        Self {
            id: model.id,
            restaurant_id: model.restaurant_id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            currency: model.currency,
            image_url: model.image_url,
            is_vegetarian: model.is_vegetarian,
            is_vegan: model.is_vegan,
            is_gluten_free: model.is_gluten_free,
            preparation_time: model.preparation_time,
            calories: model.calories,
            allergens: allergens_from_json(model.allergens),
            category_name: model.category_name,
            restaurant_name: model.restaurant_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItemSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub image_url: Option<String>,
    pub preparation_time: Option<i32>,
}

impl From<menu_items::Model> for MenuItemSummary {
    fn from(model: menu_items::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            currency: model.currency,
            image_url: model.image_url,
            preparation_time: model.preparation_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub order_number: String,
    pub order_type: String,
    pub status: String,
    /// Subtotal before tax and fees.
    pub total_amount: i64,
    pub tax_amount: i64,
    pub delivery_fee: i64,
    pub final_amount: i64,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    pub notes: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            restaurant_id: model.restaurant_id,
            order_number: model.order_number,
            order_type: model.order_type,
            status: model.status,
            total_amount: model.total_amount,
            tax_amount: model.tax_amount,
            delivery_fee: model.delivery_fee,
            final_amount: model.final_amount,
            delivery_address: model.delivery_address,
            delivery_instructions: model.delivery_instructions,
            notes: model.notes,
            estimated_delivery_time: model
                .estimated_delivery_time
                .map(|dt| dt.with_timezone(&Utc)),
            actual_delivery_time: model.actual_delivery_time.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            menu_item_id: model.menu_item_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_price: model.total_price,
            special_instructions: model.special_instructions,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            restaurant_id: model.restaurant_id,
            menu_item_id: model.menu_item_id,
            quantity: model.quantity,
            special_instructions: model.special_instructions,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_type: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_addresses::Model> for Address {
    fn from(model: user_addresses::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            address_type: model.address_type,
            address_line1: model.address_line1,
            address_line2: model.address_line2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            restaurant_id: model.restaurant_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

fn allergens_from_json(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}
