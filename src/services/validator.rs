use crate::config::HubConfig;
use crate::errors::ServiceError;
use crate::models::{Item, HUB_ITEM_DOCTYPE};
use crate::services::collaborators::{filter, FieldLookup, FileStore, RecordCounter};
use crate::services::images::ImageNormalizer;
use crate::services::keywords::KeywordIndexer;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const DEFAULT_MAX_ITEMS_PER_SELLER: u64 = 200;
pub const DEFAULT_ROUTE_PREFIX: &str = "items";

/// The validation pass run on every save of a Hub Item
#[derive(Clone)]
pub struct RecordValidator {
    counter: Arc<dyn RecordCounter>,
    keywords: KeywordIndexer,
    images: ImageNormalizer,
    max_items_per_seller: u64,
    route_prefix: String,
}

impl RecordValidator {
    pub fn new(
        counter: Arc<dyn RecordCounter>,
        lookup: Arc<dyn FieldLookup>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            counter,
            keywords: KeywordIndexer::new(lookup),
            images: ImageNormalizer::new(files),
            max_items_per_seller: DEFAULT_MAX_ITEMS_PER_SELLER,
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
        }
    }

    /// Applies the quota, route prefix and payload strictness from config
    pub fn from_config(
        config: &HubConfig,
        counter: Arc<dyn RecordCounter>,
        lookup: Arc<dyn FieldLookup>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        let mut validator = Self::new(counter, lookup, files);
        validator.max_items_per_seller = config.max_items_per_seller;
        validator.route_prefix = config.route_prefix.trim_matches('/').to_string();
        validator.images = validator.images.strict(config.strict_image_payloads);
        validator
    }

    pub fn with_max_items_per_seller(mut self, max: u64) -> Self {
        self.max_items_per_seller = max;
        self
    }

    pub fn max_items_per_seller(&self) -> u64 {
        self.max_items_per_seller
    }

    /// Runs quota, route, keyword and image steps in that order, mutating
    /// the item in place. Nothing is stored when the quota check fails.
    #[instrument(skip(self, item), fields(item = %item.name, seller = ?item.hub_seller))]
    pub async fn validate(&self, item: &mut Item) -> Result<(), ServiceError> {
        self.check_quota(item).await?;

        if item.route.as_deref().map_or(true, str::is_empty) {
            item.route = Some(self.default_route(&item.name));
        }

        item.keywords = Some(self.keywords.compute(item).await?);

        if let Some(file) = self.images.normalize(item).await? {
            info!(file_id = %file.id, "image stored during validation");
        }

        counter!("hub_items.validated", 1);
        Ok(())
    }

    async fn check_quota(&self, item: &Item) -> Result<(), ServiceError> {
        let seller = item.hub_seller.as_deref();
        let existing = self
            .counter
            .count(HUB_ITEM_DOCTYPE, &filter("hub_seller", seller))
            .await?;

        if existing >= self.max_items_per_seller {
            counter!("hub_items.quota_rejected", 1);
            warn!(existing, max = self.max_items_per_seller, "seller item quota reached");
            return Err(ServiceError::QuotaExceeded {
                seller: seller.unwrap_or_default().to_string(),
            });
        }
        Ok(())
    }

    fn default_route(&self, name: &str) -> String {
        format!("{}/{}", self.route_prefix, name)
    }
}
