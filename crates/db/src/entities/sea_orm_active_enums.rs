//! `SeaORM` active enums.
//!
//! Stored as text so the same entities work on Postgres and `SQLite`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kafala_core::ledger::{
    DonationStatus as CoreDonationStatus, DonationType as CoreDonationType,
    LifecycleStatus as CoreLifecycleStatus,
};
use kafala_core::workflow::{AnswerType as CoreAnswerType, FollowupStatus as CoreFollowupStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum LifecycleStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "removed")]
    Removed,
    #[sea_orm(string_value = "parked")]
    Parked,
    #[sea_orm(string_value = "under_more_investigation")]
    UnderMoreInvestigation,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DonationType {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DonationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AnswerType {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "single_choice")]
    SingleChoice,
    #[sea_orm(string_value = "photo")]
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FollowupStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Maps each variant one-to-one between a stored enum and its domain twin.
macro_rules! mirror_enum {
    ($db:ident <=> $core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(LifecycleStatus <=> CoreLifecycleStatus {
    Active,
    Removed,
    Parked,
    UnderMoreInvestigation,
    Completed,
});
mirror_enum!(DonationType <=> CoreDonationType { Monthly, Custom });
mirror_enum!(DonationStatus <=> CoreDonationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Redeemed,
});
mirror_enum!(AnswerType <=> CoreAnswerType {
    None,
    Text,
    SingleChoice,
    Photo,
});
mirror_enum!(FollowupStatus <=> CoreFollowupStatus {
    Pending,
    Completed,
    Cancelled,
});
