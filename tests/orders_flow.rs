mod common;

use axum::http::StatusCode;
use restaurant_hub_api::{
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        menu::{CreateCategoryRequest, CreateMenuItemRequest, MenuItemQuery},
        orders::{CreateOrderRequest, OrderLineRequest, OrderListQuery, UpdateOrderStatusRequest},
        restaurants::{CreateRestaurantRequest, CreateReviewRequest, ReviewQuery},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderType, Role},
    services::{cart_service, menu_service, order_service, restaurant_service},
    state::AppState,
};
use uuid::Uuid;

// Owner builds a menu, customer fills a cart and orders, owner moves the order along.
#[tokio::test]
async fn cart_to_delivered_order_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let owner = common::register(&state, "akosua@example.com", Role::RestaurantOwner).await?;
    let rival = common::register(&state, "yaw@example.com", Role::RestaurantOwner).await?;
    let customer = common::register(&state, "kwame@example.com", Role::Customer).await?;

    let denied = restaurant_service::create_restaurant(&state, &customer, restaurant_payload()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let restaurant = restaurant_service::create_restaurant(&state, &owner, restaurant_payload())
        .await?
        .data
        .expect("restaurant");

    let category = menu_service::create_category(
        &state,
        &owner,
        CreateCategoryRequest {
            restaurant_id: Some(restaurant.id),
            name: "Mains".into(),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("category");

    let stolen = menu_service::create_category(
        &state,
        &rival,
        CreateCategoryRequest {
            restaurant_id: Some(restaurant.id),
            name: "Specials".into(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(stolen, Err(AppError::Forbidden(_))));

    let jollof = add_item(&state, &owner, restaurant.id, category.id, "Jollof Rice", 4500).await?;
    let kelewele = add_item(&state, &owner, restaurant.id, category.id, "Kelewele", 1500).await?;

    let cheap = menu_service::list_items(
        &state,
        MenuItemQuery {
            restaurant_id: Some(restaurant.id),
            max_price: Some(2000),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(cheap.data.expect("items").len(), 1);
    assert_eq!(cheap.pagination.expect("pagination").total, 1);

    // Adding the same item twice bumps the existing line.
    let (status, _) = cart_service::add_to_cart(&state, &customer, cart_line(restaurant.id, jollof)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, line) =
        cart_service::add_to_cart(&state, &customer, cart_line(restaurant.id, jollof)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line.data.expect("cart line").quantity, 2);
    // Two adds of a new line at once still end as a single line holding both.
    let (left, right) = tokio::join!(
        cart_service::add_to_cart(&state, &customer, cart_line(restaurant.id, kelewele)),
        cart_service::add_to_cart(&state, &customer, cart_line(restaurant.id, kelewele)),
    );
    let mut statuses = [left?.0, right?.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CREATED]);
    let kelewele_line = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .expect("cart")
        .items
        .into_iter()
        .find(|line| line.item.menu_item_id == kelewele)
        .expect("kelewele line");
    assert_eq!(kelewele_line.item.quantity, 2);
    cart_service::update_cart_item(
        &state,
        &customer,
        kelewele_line.item.id,
        UpdateCartItemRequest {
            quantity: Some(1),
            special_instructions: None,
        },
    )
    .await?;

    let cart = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total, 10_500);

    let peek = cart_service::get_cart(&state, &owner, customer.user_id).await;
    assert!(matches!(peek, Err(AppError::Forbidden(_))));

    let created = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id: Some(restaurant.id),
            order_type: OrderType::Delivery,
            delivery_address: Some("12 Ring Road, Accra".into()),
            items: vec![order_line(jollof, 2), order_line(kelewele, 1)],
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("created order");

    assert!(created.order_number.starts_with("ORD-"));
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.order.status, "pending");
    assert_eq!(created.order.total_amount, 10_500);
    assert_eq!(created.order.tax_amount, 1_313);
    assert_eq!(created.order.delivery_fee, 500);
    assert_eq!(created.order.final_amount, 12_313);
    assert_eq!(created.total_amount, 12_313);

    let cart = cart_service::get_cart(&state, &customer, customer.user_id)
        .await?
        .data
        .expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    let order_id = created.order.id;

    let self_confirm = order_service::update_status(&state, &customer, order_id, set_status("confirmed")).await;
    assert!(matches!(self_confirm, Err(AppError::Forbidden(_))));

    let outsider = order_service::update_status(&state, &rival, order_id, set_status("confirmed")).await;
    assert!(matches!(outsider, Err(AppError::Forbidden(_))));

    let bogus = order_service::update_status(&state, &owner, order_id, set_status("shipped")).await;
    assert!(matches!(bogus, Err(AppError::BadRequest(_))));

    let preparing = order_service::update_status(&state, &owner, order_id, set_status("preparing"))
        .await?
        .data
        .expect("order");
    assert_eq!(preparing.status, "preparing");

    let late_cancel = order_service::update_status(&state, &customer, order_id, set_status("cancelled")).await;
    assert!(matches!(late_cancel, Err(AppError::BadRequest(_))));

    let delivered = order_service::update_status(&state, &owner, order_id, set_status("delivered"))
        .await?
        .data
        .expect("order");
    assert_eq!(delivered.status, "delivered");
    assert!(delivered.actual_delivery_time.is_some());

    let detail = order_service::get_order(&state, &owner, order_id)
        .await?
        .data
        .expect("order detail");
    assert_eq!(detail.order_items.len(), 2);
    assert_eq!(
        detail.customer.as_ref().map(|c| c.id),
        Some(customer.user_id)
    );

    let hidden = order_service::get_order(&state, &rival, order_id).await;
    assert!(matches!(hidden, Err(AppError::Forbidden(_))));

    // A pending pickup order can be cancelled by the customer and carries no delivery fee.
    let pickup = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id: Some(restaurant.id),
            order_type: OrderType::Pickup,
            items: vec![order_line(kelewele, 1)],
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("pickup order");
    assert_eq!(pickup.order.delivery_fee, 0);
    assert_eq!(pickup.order.final_amount, 1_500 + 188);

    let cancelled = order_service::update_status(&state, &customer, pickup.order.id, set_status("cancelled"))
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.status, "cancelled");

    let mine = order_service::list_orders(&state, &customer, OrderListQuery::default()).await?;
    assert_eq!(mine.pagination.expect("pagination").total, 2);

    let theirs = order_service::list_orders(&state, &rival, OrderListQuery::default()).await?;
    assert_eq!(theirs.pagination.expect("pagination").total, 0);

    let foreign = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            restaurant_id: Some(restaurant.id),
            items: vec![order_line(Uuid::new_v4(), 1)],
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(foreign, Err(AppError::BadRequest(_))));

    let bad_rating = restaurant_service::create_review(
        &state,
        &customer,
        restaurant.id,
        CreateReviewRequest {
            rating: Some(6),
            comment: None,
        },
    )
    .await;
    assert!(matches!(bad_rating, Err(AppError::BadRequest(_))));

    restaurant_service::create_review(
        &state,
        &customer,
        restaurant.id,
        CreateReviewRequest {
            rating: Some(5),
            comment: Some("Best jollof in Osu".into()),
        },
    )
    .await?;
    let reviews = restaurant_service::list_reviews(&state, restaurant.id, ReviewQuery::default()).await?;
    assert_eq!(reviews.pagination.expect("pagination").total, 1);

    // Deactivated restaurants disappear for the public but not for their owner.
    restaurant_service::deactivate_restaurant(&state, &owner, restaurant.id).await?;
    let public = restaurant_service::get_restaurant(&state, None, restaurant.id).await;
    assert!(matches!(public, Err(AppError::NotFound(_))));
    let own = restaurant_service::get_restaurant(&state, Some(&owner), restaurant.id)
        .await?
        .data
        .expect("restaurant");
    assert_eq!(own.menu_categories.len(), 1);
    assert_eq!(own.menu_categories[0].menu_items.len(), 2);

    Ok(())
}

fn restaurant_payload() -> CreateRestaurantRequest {
    CreateRestaurantRequest {
        name: "Sika Kitchen".into(),
        description: "Home-style Ghanaian dishes".into(),
        cuisine_type: "Ghanaian".into(),
        address: Some("14 Oxford Street, Osu".into()),
        ..Default::default()
    }
}

async fn add_item(
    state: &AppState,
    owner: &AuthUser,
    restaurant_id: Uuid,
    category_id: Uuid,
    name: &str,
    price: i64,
) -> anyhow::Result<Uuid> {
    let item = menu_service::create_item(
        state,
        owner,
        CreateMenuItemRequest {
            restaurant_id: Some(restaurant_id),
            category_id: Some(category_id),
            name: name.into(),
            price: Some(price),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("menu item");
    assert_eq!(item.currency, "GHS");
    Ok(item.id)
}

fn cart_line(restaurant_id: Uuid, menu_item_id: Uuid) -> AddToCartRequest {
    AddToCartRequest {
        restaurant_id: Some(restaurant_id),
        menu_item_id: Some(menu_item_id),
        quantity: Some(1),
        ..Default::default()
    }
}

fn order_line(menu_item_id: Uuid, quantity: i32) -> OrderLineRequest {
    OrderLineRequest {
        menu_item_id,
        quantity,
        special_instructions: None,
    }
}

fn set_status(value: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: Some(value.into()),
    }
}
