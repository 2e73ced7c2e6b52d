use crate::config::HubConfig;
use crate::db::DbPool;
use crate::entities::{hub_item, hub_seller};
use crate::errors::ServiceError;
use crate::models::Item;
use crate::services::files::LocalFileStore;
use crate::services::hashing::RandomHashGenerator;
use crate::services::naming::ItemNamer;
use crate::services::records::SeaOrmRecords;
use crate::services::validator::RecordValidator;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Persistence for Hub Items; names and validates every item before it is saved
#[derive(Clone)]
pub struct HubItemService {
    db_pool: Arc<DbPool>,
    namer: ItemNamer,
    validator: RecordValidator,
}

impl HubItemService {
    pub fn new(db_pool: Arc<DbPool>, namer: ItemNamer, validator: RecordValidator) -> Self {
        Self {
            db_pool,
            namer,
            validator,
        }
    }

    /// Wires the SeaORM, local disk and random hash collaborators
    pub fn with_defaults(db_pool: Arc<DbPool>, config: &HubConfig) -> Self {
        let records = Arc::new(SeaOrmRecords::new(db_pool.clone()));
        let files = Arc::new(LocalFileStore::new(
            db_pool.clone(),
            config.files_root.clone(),
        ));
        let namer = ItemNamer::new(
            Arc::new(RandomHashGenerator),
            config.name_prefix_length,
            config.name_hash_length,
        );
        let validator = RecordValidator::from_config(config, records.clone(), records, files);
        Self::new(db_pool, namer, validator)
    }

    /// Names, validates and inserts a new item. Any client supplied name is discarded.
    #[instrument(skip(self, item), fields(item_name = ?item.item_name))]
    pub async fn create_item(&self, mut item: Item) -> Result<Item, ServiceError> {
        item.name.clear();
        self.namer.autoname(&mut item);
        self.check_links(&item).await?;
        self.validator.validate(&mut item).await?;

        let now = Utc::now();
        let mut active = hub_item::ActiveModel {
            name: Set(item.name.clone()),
            created_at: Set(now),
            modified_at: Set(now),
            ..Default::default()
        };
        apply(&item, &mut active);

        let model = active
            .insert(self.db_pool.as_ref())
            .await
            .map_err(constraint_error)?;
        info!(name = %model.name, "Hub item created");
        Item::try_from(model)
    }

    /// Validates and saves new values for an existing item; the name never changes.
    /// Fields left unset in `item` keep their stored values.
    #[instrument(skip(self, item))]
    pub async fn update_item(&self, name: &str, mut item: Item) -> Result<Item, ServiceError> {
        let existing = self.find_model(name).await?;

        item.fill_missing_from(&Item::try_from(existing.clone())?);
        item.name = existing.name.clone();
        self.check_links(&item).await?;
        self.validator.validate(&mut item).await?;

        let mut active: hub_item::ActiveModel = existing.into();
        apply(&item, &mut active);
        active.modified_at = Set(Utc::now());

        let model = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(constraint_error)?;
        info!(name = %model.name, "Hub item updated");
        Item::try_from(model)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, name: &str) -> Result<Item, ServiceError> {
        Item::try_from(self.find_model(name).await?)
    }

    /// Looks an item up by its website route
    #[instrument(skip(self))]
    pub async fn get_by_route(&self, route: &str) -> Result<Item, ServiceError> {
        let model = hub_item::Entity::find()
            .filter(hub_item::Column::Route.eq(route))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No Hub Item at route {}", route)))?;
        Item::try_from(model)
    }

    /// Newest first. Pages start at 1.
    #[instrument(skip(self))]
    pub async fn list_items(&self, page: u64, limit: u64) -> Result<(Vec<Item>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let total = hub_item::Entity::find().count(db).await?;

        let offset = page
            .saturating_sub(1)
            .checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| ServiceError::InvalidInput(format!("page {} is out of range", page)))?;
        let models = hub_item::Entity::find()
            .order_by_desc(hub_item::Column::CreatedAt)
            .order_by_asc(hub_item::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        let items = models
            .into_iter()
            .map(Item::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, name: &str) -> Result<(), ServiceError> {
        let result = hub_item::Entity::delete_by_id(name.to_string())
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found(name));
        }
        info!(name, "Hub item deleted");
        Ok(())
    }

    /// Rejects sellers that do not exist and routes already taken by another item
    async fn check_links(&self, item: &Item) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        if let Some(seller) = item.hub_seller.as_deref() {
            if hub_seller::Entity::find_by_id(seller.to_string())
                .one(db)
                .await?
                .is_none()
            {
                return Err(ServiceError::ValidationError(format!(
                    "Could not find Hub Seller: {}",
                    seller
                )));
            }
        }

        if let Some(route) = item.route.as_deref().filter(|route| !route.is_empty()) {
            let taken = hub_item::Entity::find()
                .filter(hub_item::Column::Route.eq(route))
                .filter(hub_item::Column::Name.ne(item.name.as_str()))
                .one(db)
                .await?;
            if let Some(other) = taken {
                return Err(route_taken(route, &other.name));
            }
        }
        Ok(())
    }

    async fn find_model(&self, name: &str) -> Result<hub_item::Model, ServiceError> {
        hub_item::Entity::find_by_id(name.to_string())
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| not_found(name))
    }
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::NotFound(format!("Hub Item {} not found", name))
}

fn route_taken(route: &str, owner: &str) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Route {} is already used by Hub Item {}",
        route, owner
    ))
}

/// Constraint failures that slip past `check_links` are still bad input
fn constraint_error(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            ServiceError::ValidationError(format!("Duplicate value: {}", detail))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            ServiceError::ValidationError(format!("Linked record missing: {}", detail))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

fn apply(item: &Item, active: &mut hub_item::ActiveModel) {
    active.item_name = Set(item.item_name.clone());
    active.item_code = Set(item.item_code.clone());
    active.hub_category = Set(item.hub_category.clone());
    active.hub_seller = Set(item.hub_seller.clone());
    active.route = Set(item.route.clone());
    active.image = Set(item.image.to_column());
    active.keywords = Set(item.keywords.clone());
}
