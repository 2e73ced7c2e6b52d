use crate::entities::{File, HubItem, HubSeller};
use crate::errors::ServiceError;
use crate::models::{HUB_ITEM_DOCTYPE, HUB_SELLER_DOCTYPE};
use crate::services::collaborators::{FieldLookup, Filters, RecordCounter};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Value,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

const FILE_DOCTYPE: &str = "File";

/// Record counting and field lookup over the hub tables
#[derive(Clone)]
pub struct SeaOrmRecords {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRecords {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn count_in<E>(&self, filters: &Filters) -> Result<u64, ServiceError>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
    {
        let mut query = E::find();
        for (field, value) in filters {
            let column = column::<E>(field)?;
            query = match value {
                Some(value) => query.filter(column.eq(value.clone())),
                None => query.filter(column.is_null()),
            };
        }

        Ok(query.count(&*self.db).await?)
    }

    async fn value_in<E>(&self, name: &str, fieldname: &str) -> Result<Option<String>, ServiceError>
    where
        E: EntityTrait,
    {
        let target = column::<E>(fieldname)?;
        let record = E::find()
            .filter(column::<E>("name")?.eq(name))
            .one(&*self.db)
            .await?;

        Ok(record.and_then(|model| match model.get(target) {
            Value::String(Some(value)) => Some(*value),
            _ => None,
        }))
    }
}

fn column<E: EntityTrait>(field: &str) -> Result<E::Column, ServiceError> {
    E::Column::from_str(field)
        .map_err(|_| ServiceError::InvalidInput(format!("unknown field '{}'", field)))
}

fn unknown_doctype(doctype: &str) -> ServiceError {
    ServiceError::InvalidInput(format!("unknown doctype '{}'", doctype))
}

#[async_trait]
impl RecordCounter for SeaOrmRecords {
    #[instrument(skip(self))]
    async fn count(&self, doctype: &str, filters: &Filters) -> Result<u64, ServiceError> {
        let count = match doctype {
            HUB_ITEM_DOCTYPE => self.count_in::<HubItem>(filters).await?,
            HUB_SELLER_DOCTYPE => self.count_in::<HubSeller>(filters).await?,
            FILE_DOCTYPE => self.count_in::<File>(filters).await?,
            other => return Err(unknown_doctype(other)),
        };
        debug!(count, "counted records");
        Ok(count)
    }
}

#[async_trait]
impl FieldLookup for SeaOrmRecords {
    #[instrument(skip(self))]
    async fn get_field_value(
        &self,
        doctype: &str,
        name: &str,
        fieldname: &str,
    ) -> Result<Option<String>, ServiceError> {
        match doctype {
            HUB_ITEM_DOCTYPE => self.value_in::<HubItem>(name, fieldname).await,
            HUB_SELLER_DOCTYPE => self.value_in::<HubSeller>(name, fieldname).await,
            other => Err(unknown_doctype(other)),
        }
    }
}
