use crate::errors::ServiceError;
use crate::models::{Item, HUB_ITEM_DOCTYPE};
use crate::services::collaborators::{filter, HashGenerator, RecordCounter};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Assigns `<prefix>-<hash>` identifiers to new items
#[derive(Clone)]
pub struct ItemNamer {
    hasher: Arc<dyn HashGenerator>,
    prefix_length: usize,
    hash_length: usize,
}

impl ItemNamer {
    pub fn new(hasher: Arc<dyn HashGenerator>, prefix_length: usize, hash_length: usize) -> Self {
        Self {
            hasher,
            prefix_length,
            hash_length,
        }
    }

    /// Names the item on its first save. Named items are left untouched.
    pub fn autoname(&self, item: &mut Item) {
        if !item.is_new() {
            return;
        }

        let mut prefix: String = standard_name(item)
            .chars()
            .take(self.prefix_length)
            .collect();
        let missing = self.prefix_length - prefix.chars().count();
        if missing > 0 {
            let filler = self.hasher.generate_hash(HUB_ITEM_DOCTYPE, missing);
            prefix.extend(filler.chars().take(missing));
        }

        let hash: String = self
            .hasher
            .generate_hash(HUB_ITEM_DOCTYPE, self.hash_length)
            .chars()
            .take(self.hash_length)
            .collect();

        item.name = format!("{}-{}", prefix, hash);
        debug!(name = %item.name, "named new item");
    }
}

/// The item name lowercased, with every run of other characters turned into `-`
pub fn standard_name(item: &Item) -> String {
    let lowered = item.item_name.as_deref().unwrap_or_default().to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Returns `value`, or `value-N` when `N` records already have `field == value`
pub async fn autoname_increment_by_field(
    counter: &dyn RecordCounter,
    doctype: &str,
    field: &str,
    value: &str,
) -> Result<String, ServiceError> {
    let count = counter.count(doctype, &filter(field, Some(value))).await?;
    if count > 0 {
        Ok(format!("{}-{}", value, count))
    } else {
        Ok(value.to_string())
    }
}
