use crate::{
    errors::ServiceError,
    models::{ImageField, Item},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Field used as the page title of an item page
pub const PAGE_TITLE_FIELD: &str = "item_name";

/// Rendering flags for a single item page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPageContext {
    pub title: String,
    pub no_cache: bool,
    pub page_title_field: &'static str,
}

impl ItemPageContext {
    pub fn for_item(item: &Item) -> Self {
        let title = item
            .get(PAGE_TITLE_FIELD)
            .unwrap_or(item.name.as_str())
            .to_string();
        Self {
            title,
            no_cache: true,
            page_title_field: PAGE_TITLE_FIELD,
        }
    }
}

/// Rendering flags for the item list page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListContext {
    pub allow_guest: bool,
    pub no_cache: bool,
    pub title: String,
    pub no_breadcrumbs: bool,
    pub order_by: &'static str,
}

impl ListContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            allow_guest: true,
            no_cache: true,
            title: title.into(),
            no_breadcrumbs: true,
            order_by: "creation desc",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub context: ItemPageContext,
    pub item: Item,
}

#[derive(Debug, Serialize)]
pub struct ItemList {
    pub context: ListContext,
    #[serde(flatten)]
    pub page: PaginatedResponse<Item>,
}

/// Body of create and update requests. `name` is never accepted from clients.
#[derive(Debug, Deserialize, Validate)]
pub struct ItemRequest {
    #[validate(length(min = 1, max = 140))]
    pub item_name: Option<String>,
    #[validate(length(max = 140))]
    pub item_code: Option<String>,
    pub hub_category: Option<String>,
    pub hub_seller: Option<String>,
    #[validate(length(max = 255))]
    pub route: Option<String>,
    #[serde(default)]
    pub image: ImageField,
}

impl From<ItemRequest> for Item {
    fn from(request: ItemRequest) -> Self {
        Item {
            name: String::new(),
            item_name: request.item_name,
            item_code: request.item_code,
            hub_category: request.hub_category,
            hub_seller: request.hub_seller,
            route: request.route,
            image: request.image,
            keywords: None,
        }
    }
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/:name",
            get(get_item).put(update_item).delete(delete_item),
        )
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ItemList> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let (items, total) = state.item_service().list_items(page, limit).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ApiResponse::success(ItemList {
        context: ListContext::new(state.config.list_page_title.clone()),
        page: PaginatedResponse {
            items,
            total,
            page,
            limit,
            total_pages,
        },
    })))
}

/// Resolves `name` as an item name first, then as the last segment of a route
pub async fn get_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<ItemPage> {
    let service = state.item_service();
    let item = match service.get_item(&name).await {
        Err(ServiceError::NotFound(_)) => {
            let route = format!("{}/{}", state.config.route_prefix.trim_matches('/'), name);
            service.get_by_route(&route).await?
        }
        other => other?,
    };

    Ok(Json(ApiResponse::success(ItemPage {
        context: ItemPageContext::for_item(&item),
        item,
    })))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<ItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Item>>), ServiceError> {
    payload.validate()?;

    let created = state.item_service().create_item(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Fields missing from the body keep their stored values
pub async fn update_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<ItemRequest>,
) -> ApiResult<Item> {
    payload.validate()?;

    let updated = state
        .item_service()
        .update_item(&name, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<String> {
    state.item_service().delete_item(&name).await?;
    Ok(Json(ApiResponse::message(name, "Hub Item deleted")))
}
