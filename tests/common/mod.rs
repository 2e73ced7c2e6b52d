#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use chrono::{Duration as ChronoDuration, Utc};
use hub_items::{
    config::HubConfig,
    db::{self, DbConfig, DbPool},
    entities::{file, hub_item, hub_seller},
    services::HubItemService,
    AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// An in-memory SQLite database with the hub tables and a scratch files root
pub struct TestHub {
    pub db: Arc<DbPool>,
    pub config: HubConfig,
    pub files_dir: TempDir,
}

impl TestHub {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut HubConfig)) -> Self {
        let files_dir = tempfile::tempdir().expect("failed to create files root");

        let mut config = HubConfig::new("sqlite::memory:");
        config.files_root = files_dir.path().to_path_buf();
        customize(&mut config);

        // one connection: every pooled in-memory connection is its own database
        let pool = db::establish_connection_with_config(&DbConfig {
            url: config.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        })
        .await
        .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to create hub tables");

        Self {
            db: Arc::new(pool),
            config,
            files_dir,
        }
    }

    pub fn service(&self) -> HubItemService {
        HubItemService::with_defaults(self.db.clone(), &self.config)
    }

    pub fn router(&self) -> Router {
        hub_items::router(AppState::new(self.db.clone(), self.config.clone()))
    }

    pub async fn insert_seller(
        &self,
        name: &str,
        company: Option<&str>,
        country: Option<&str>,
        company_description: Option<&str>,
    ) {
        let seller = hub_seller::ActiveModel {
            name: Set(name.to_string()),
            company: Set(company.map(str::to_string)),
            country: Set(country.map(str::to_string)),
            company_description: Set(company_description.map(str::to_string)),
        };
        hub_seller::Entity::insert(seller)
            .exec(self.db.as_ref())
            .await
            .expect("failed to insert seller");
    }

    /// Inserts `count` rows for `seller` directly, without naming or validation
    pub async fn seed_items(&self, seller: &str, count: usize) {
        let start = Utc::now() - ChronoDuration::days(1);
        let rows = (0..count).map(|i| {
            let created = start + ChronoDuration::seconds(i as i64);
            hub_item::ActiveModel {
                name: Set(format!("seeded-{}-{:05}", seller, i)),
                item_name: Set(Some(format!("Seeded {}", i))),
                item_code: Set(None),
                hub_category: Set(None),
                hub_seller: Set(Some(seller.to_string())),
                route: Set(None),
                image: Set(None),
                keywords: Set(None),
                created_at: Set(created),
                modified_at: Set(created),
            }
        });

        let rows: Vec<_> = rows.collect();
        for chunk in rows.chunks(50) {
            hub_item::Entity::insert_many(chunk.to_vec())
                .exec(self.db.as_ref())
                .await
                .expect("failed to seed items");
        }
    }

    pub async fn files_attached_to(&self, name: &str) -> Vec<file::Model> {
        file::Entity::find()
            .filter(file::Column::AttachedToName.eq(name))
            .all(self.db.as_ref())
            .await
            .expect("failed to query files")
    }

    pub async fn file_count(&self) -> u64 {
        file::Entity::find()
            .count(self.db.as_ref())
            .await
            .expect("failed to count files")
    }

    pub async fn raw_item(&self, name: &str) -> hub_item::Model {
        hub_item::Entity::find_by_id(name.to_string())
            .one(self.db.as_ref())
            .await
            .expect("failed to query item")
            .expect("item should exist")
    }
}

/// Sends `request` through `router` and returns the status and the body
pub async fn send(router: &Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    // extractor rejections are plain text
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request")
}
