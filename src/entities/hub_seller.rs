use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Seller account; owned by the wider Hub, read-only here
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hub_sellers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    pub company: Option<String>,
    pub country: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub company_description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hub_item::Entity")]
    HubItems,
}

impl Related<super::hub_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HubItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
