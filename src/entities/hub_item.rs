use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hub Item row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hub_items")]
pub struct Model {
    /// `<prefix>-<hash>` identifier, fixed after the first save
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    pub item_name: Option<String>,
    pub item_code: Option<String>,
    pub hub_category: Option<String>,

    /// Owning seller (`hub_sellers.name`)
    #[sea_orm(indexed)]
    pub hub_seller: Option<String>,

    #[sea_orm(unique)]
    pub route: Option<String>,

    /// Stored file URL, or a pending `{file_name, base64}` payload before validation
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,

    /// Space-joined search string
    #[sea_orm(column_type = "Text", nullable)]
    pub keywords: Option<String>,

    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hub_seller::Entity",
        from = "Column::HubSeller",
        to = "super::hub_seller::Column::Name"
    )]
    HubSeller,
}

impl Related<super::hub_seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HubSeller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
