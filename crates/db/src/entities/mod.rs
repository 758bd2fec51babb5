//! `SeaORM` entity definitions.

pub mod cases;
pub mod donation_handovers;
pub mod donations;
pub mod followup_actions;
pub mod sea_orm_active_enums;
pub mod user_roles;

pub use cases::Entity as Cases;
pub use donation_handovers::Entity as DonationHandovers;
pub use donations::Entity as Donations;
pub use followup_actions::Entity as FollowupActions;
pub use user_roles::Entity as UserRoles;
