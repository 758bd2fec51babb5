//! `SeaORM` Entity for donations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DonationStatus, DonationType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub case_id: Uuid,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub donation_type: DonationType,
    pub months_pledged: i32,
    pub status: DonationStatus,
    pub payment_code: String,
    pub payment_reference: Option<String>,
    pub admin_notes: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_handed_over: Decimal,
    pub version: i64,
    pub confirmed_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cases::Entity",
        from = "Column::CaseId",
        to = "super::cases::Column::Id"
    )]
    Cases,
    #[sea_orm(has_many = "super::donation_handovers::Entity")]
    DonationHandovers,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl Related<super::donation_handovers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationHandovers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
