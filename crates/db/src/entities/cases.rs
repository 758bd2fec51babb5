//! `SeaORM` Entity for cases table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LifecycleStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub title_ar: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_cost: Decimal,
    pub months_needed: Option<i32>,
    pub months_covered: i32,
    pub status: String,
    pub lifecycle_status: LifecycleStatus,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::donations::Entity")]
    Donations,
    #[sea_orm(has_many = "super::donation_handovers::Entity")]
    DonationHandovers,
    #[sea_orm(has_many = "super::followup_actions::Entity")]
    FollowupActions,
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::donation_handovers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationHandovers.def()
    }
}

impl Related<super::followup_actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FollowupActions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
