//! Hub Items
//!
//! Marketplace item records for the Hub: seller quotas, generated names and
//! routes, keyword indexing, inline image extraction and remote file mirroring.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<services::hub_items::HubItemService>,
    pub config: Arc<config::HubConfig>,
}

impl AppState {
    pub fn new(db: Arc<db::DbPool>, config: config::HubConfig) -> Self {
        let items = Arc::new(services::hub_items::HubItemService::with_defaults(
            db, &config,
        ));
        Self {
            items,
            config: Arc::new(config),
        }
    }

    pub fn item_service(&self) -> Arc<services::hub_items::HubItemService> {
        self.items.clone()
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Item routes mounted under the configured route prefix, plus `/health`
pub fn router(state: AppState) -> Router {
    let base = format!("/{}", state.config.route_prefix.trim_matches('/'));

    Router::new()
        .route("/health", get(health))
        .nest(&base, handlers::items::item_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}
