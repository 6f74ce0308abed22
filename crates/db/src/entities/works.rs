//! `SeaORM` Entity for works table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RoyaltyType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "works")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub isbn: Option<String>,
    pub price: i64,
    pub stock: i64,
    pub status: String,
    pub author_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub royalty_rate: Decimal,
    pub royalty_type: RoyaltyType,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::partner_stocks::Entity")]
    PartnerStocks,
    #[sea_orm(has_many = "super::royalties::Entity")]
    Royalties,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::partner_stocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartnerStocks.def()
    }
}

impl Related<super::royalties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Royalties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
