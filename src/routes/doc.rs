use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthPayload, ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse,
            LoginRequest, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
        },
        cart::{AddToCartRequest, CartItemDetail, CartView, UpdateCartItemRequest},
        menu::{
            CreateCategoryRequest, CreateMenuItemRequest, MenuItemDetail, UpdateCategoryRequest,
            UpdateMenuItemRequest,
        },
        orders::{
            CreateOrderRequest, CreatedOrder, OrderDetail, OrderItemDetail, OrderLineRequest,
            UpdateOrderStatusRequest,
        },
        restaurants::{
            CategoryWithItems, CreateRestaurantRequest, CreateReviewRequest, RestaurantWithMenu,
            ReviewWithRestaurant, ReviewWithUser, UpdateRestaurantRequest,
        },
        users::{
            CreateAddressRequest, UpdateAddressRequest, UpdateUserRequest,
            UpdateUserStatusRequest, UserStatus,
        },
    },
    models::{
        Address, CartItem, MenuCategory, MenuItem, MenuItemListing, MenuItemSummary, Order,
        OrderItem, OrderStatus, OrderType, Restaurant, RestaurantImage, RestaurantListing,
        RestaurantSummary, Review, Role, User, UserSummary,
    },
    pricing::OrderTotals,
    response::{ErrorResponse, Meta},
    routes::{auth, health, menu, orders, restaurants, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::profile,
        auth::update_profile,
        auth::change_password,
        auth::forgot_password,
        auth::reset_password,
        auth::logout,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        restaurants::list_reviews,
        restaurants::create_review,
        menu::list_items,
        menu::get_item,
        menu::create_item,
        menu::update_item,
        menu::delete_item,
        menu::list_categories,
        menu::create_category,
        menu::update_category,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order_status,
        orders::get_cart,
        orders::add_to_cart,
        orders::update_cart_item,
        orders::remove_cart_item,
        orders::clear_cart,
        users::list_users,
        users::get_user,
        users::update_user,
        users::update_user_status,
        users::list_addresses,
        users::create_address,
        users::update_address,
        users::delete_address,
        users::list_user_orders,
        users::list_user_reviews
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            OrderType,
            User,
            UserSummary,
            Restaurant,
            RestaurantSummary,
            RestaurantListing,
            RestaurantImage,
            MenuCategory,
            MenuItem,
            MenuItemListing,
            MenuItemSummary,
            Order,
            OrderItem,
            CartItem,
            Address,
            Review,
            OrderTotals,
            Meta,
            ErrorResponse,
            health::HealthData,
            RegisterRequest,
            LoginRequest,
            AuthPayload,
            UpdateProfileRequest,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ResetPasswordRequest,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            CategoryWithItems,
            RestaurantWithMenu,
            CreateReviewRequest,
            ReviewWithUser,
            ReviewWithRestaurant,
            MenuItemDetail,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            OrderLineRequest,
            CreateOrderRequest,
            CreatedOrder,
            OrderItemDetail,
            OrderDetail,
            UpdateOrderStatusRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDetail,
            CartView,
            UpdateUserRequest,
            UpdateUserStatusRequest,
            UserStatus,
            CreateAddressRequest,
            UpdateAddressRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Registration, login and password management"),
        (name = "Restaurants", description = "Restaurants and reviews"),
        (name = "Menu", description = "Menu items and categories"),
        (name = "Orders", description = "Order placement and tracking"),
        (name = "Cart", description = "Server-side cart"),
        (name = "Users", description = "Accounts, addresses and history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_api_area() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/auth/register",
            "/api/restaurants/{id}/reviews",
            "/api/menu/items",
            "/api/orders/{id}/status",
            "/api/orders/cart/clear/{user_id}",
            "/api/users/{id}/addresses/{address_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
