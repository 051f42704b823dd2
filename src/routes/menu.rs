use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::menu::{
        CategoryQuery, CreateCategoryRequest, CreateMenuItemRequest, MenuItemDetail,
        MenuItemQuery, UpdateCategoryRequest, UpdateMenuItemRequest,
    },
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthUser,
    models::{MenuCategory, MenuItem, MenuItemListing},
    response::ApiResponse,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category))
}

#[utoipa::path(
    get,
    path = "/api/menu/items",
    params(MenuItemQuery),
    responses((status = 200, description = "Available menu items", body = ApiResponse<Vec<MenuItemListing>>)),
    tag = "Menu"
)]
pub async fn list_items(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MenuItemQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuItemListing>>>> {
    let resp = menu_service::list_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItemDetail>),
        (status = 404, description = "Menu item not found")
    ),
    tag = "Menu"
)]
pub async fn get_item(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItemDetail>>> {
    let resp = menu_service::get_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menu/items",
    request_body = CreateMenuItemRequest,
    responses((status = 201, description = "Menu item created", body = ApiResponse<MenuItem>)),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateMenuItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
    let resp = menu_service::create_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses((status = 200, description = "Menu item updated", body = ApiResponse<MenuItem>)),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item id")),
    responses((status = 200, description = "Menu item marked unavailable")),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = menu_service::delete_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    params(CategoryQuery),
    responses((status = 200, description = "Active categories", body = ApiResponse<Vec<MenuCategory>>)),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CategoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuCategory>>>> {
    let resp = menu_service::list_categories(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menu/categories",
    request_body = CreateCategoryRequest,
    responses((status = 201, description = "Category created", body = ApiResponse<MenuCategory>)),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuCategory>>)> {
    let resp = menu_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/menu/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses((status = 200, description = "Category updated", body = ApiResponse<MenuCategory>)),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<MenuCategory>>> {
    let resp = menu_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
