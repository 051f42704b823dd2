use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::OrderDetail,
        restaurants::{ReviewQuery, ReviewWithRestaurant},
        users::{
            CreateAddressRequest, UpdateAddressRequest, UpdateUserRequest,
            UpdateUserStatusRequest, UserListQuery, UserOrdersQuery, UserStatus,
        },
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{Address, User},
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user))
        .route("/{id}/status", patch(update_user_status))
        .route("/{id}/addresses", get(list_addresses).post(create_address))
        .route(
            "/{id}/addresses/{address_id}",
            put(update_address).delete(delete_address),
        )
        .route("/{id}/orders", get(list_user_orders))
        .route("/{id}/reviews", get(list_user_reviews))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users, newest first", body = ApiResponse<Vec<User>>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<UserListQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let resp = user_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "User updated", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<UserStatus>),
        (status = 400, description = "is_active must be a boolean value")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserStatusRequest>,
) -> AppResult<Json<ApiResponse<UserStatus>>> {
    let resp = user_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/addresses",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Addresses, default first", body = ApiResponse<Vec<Address>>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Address>>>> {
    let resp = user_service::list_addresses(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/addresses",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = CreateAddressRequest,
    responses((status = 201, description = "Address created", body = ApiResponse<Address>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateAddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Address>>)> {
    let resp = user_service::create_address(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/addresses/{address_id}",
    params(
        ("id" = Uuid, Path, description = "User id"),
        ("address_id" = Uuid, Path, description = "Address id")
    ),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<Address>),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((id, address_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateAddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = user_service::update_address(&state, &user, id, address_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/addresses/{address_id}",
    params(
        ("id" = Uuid, Path, description = "User id"),
        ("address_id" = Uuid, Path, description = "Address id")
    ),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Address not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((id, address_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = user_service::delete_address(&state, &user, id, address_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/orders",
    params(("id" = Uuid, Path, description = "User id"), UserOrdersQuery),
    responses((status = 200, description = "Order history", body = ApiResponse<Vec<OrderDetail>>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<UserOrdersQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    let resp = user_service::list_orders(&state, &user, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/reviews",
    params(("id" = Uuid, Path, description = "User id"), ReviewQuery),
    responses((status = 200, description = "Reviews written by the user", body = ApiResponse<Vec<ReviewWithRestaurant>>)),
    tag = "Users"
)]
pub async fn list_user_reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ReviewQuery>,
) -> AppResult<Json<ApiResponse<Vec<ReviewWithRestaurant>>>> {
    let resp = user_service::list_reviews(&state, id, query).await?;
    Ok(Json(resp))
}
