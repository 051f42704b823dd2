use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::restaurants::{
        CreateRestaurantRequest, CreateReviewRequest, RestaurantWithMenu, ReviewQuery,
        ReviewWithUser, UpdateRestaurantRequest,
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::{Restaurant, RestaurantListing, Review},
    response::ApiResponse,
    services::restaurant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restaurants).post(create_restaurant))
        .route(
            "/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/{id}/reviews", get(list_reviews).post(create_review))
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    responses((status = 200, description = "Active restaurants", body = ApiResponse<Vec<RestaurantListing>>)),
    tag = "Restaurants"
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RestaurantListing>>>> {
    let resp = restaurant_service::list_restaurants(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant with menu", body = ApiResponse<RestaurantWithMenu>),
        (status = 404, description = "Restaurant not found")
    ),
    tag = "Restaurants"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<RestaurantWithMenu>>> {
    let resp = restaurant_service::get_restaurant(&state, viewer.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = ApiResponse<Restaurant>),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Restaurant>>)> {
    let resp = restaurant_service::create_restaurant(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    request_body = UpdateRestaurantRequest,
    responses((status = 200, description = "Restaurant updated", body = ApiResponse<Restaurant>)),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_restaurant(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    responses((status = 200, description = "Restaurant deactivated")),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = restaurant_service::deactivate_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}/reviews",
    params(("id" = Uuid, Path, description = "Restaurant id"), ReviewQuery),
    responses((status = 200, description = "Reviews, newest first", body = ApiResponse<Vec<ReviewWithUser>>)),
    tag = "Restaurants"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ReviewQuery>,
) -> AppResult<Json<ApiResponse<Vec<ReviewWithUser>>>> {
    let resp = restaurant_service::list_reviews(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restaurants/{id}/reviews",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Rating must be between 1 and 5")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = restaurant_service::create_review(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
