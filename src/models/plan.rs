//! Plan entity model
//!
//! This module contains the SeaORM entity model for the plans table, the
//! read-only subscription plan catalog seeded at startup.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Price tiers a plan may carry.
pub const PRICE_TIERS: &[&str] = &["free", "$10/mo", "$25/mo", "$99/mo"];

/// Plan entity representing a subscription tier
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    /// Unique identifier for the plan (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the plan, unique across the catalog
    pub name: String,

    /// Human-readable description of what the plan offers
    pub description: String,

    /// Price tier, one of [`PRICE_TIERS`]
    pub price: String,

    /// Timestamp when the plan was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the plan was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscription,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
