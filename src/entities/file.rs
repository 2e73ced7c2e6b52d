use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored binary asset attached to some record
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub file_name: String,

    /// `/files/<name>` or `/private/files/<name>`
    pub file_url: String,

    /// Doctype of the owning record, e.g. "Hub Item"
    #[sea_orm(indexed)]
    pub attached_to_doctype: Option<String>,

    #[sea_orm(indexed)]
    pub attached_to_name: Option<String>,

    pub is_private: bool,

    /// sha256 of the content, hex encoded
    pub content_hash: String,

    pub file_size: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
