//! App entity model
//!
//! This module contains the SeaORM entity model for the apps table. An app
//! is owned by at most one user; current_subscription_id is a cached
//! pointer maintained by the activation service, not a foreign key.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::auth::Owned;

/// Kinds of app that can be created.
pub const APP_KINDS: &[&str] = &["web", "mobile"];

/// Frameworks an app can be scaffolded with.
pub const APP_FRAMEWORKS: &[&str] = &["django", "react-native"];

/// App entity representing a user-owned application
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "apps")]
pub struct Model {
    /// Unique identifier for the app (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name for the app
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// App kind, one of [`APP_KINDS`]
    pub kind: String,

    /// Framework the app is built with, one of [`APP_FRAMEWORKS`]
    pub framework: String,

    /// Optional custom domain
    pub domain_name: Option<String>,

    /// Screenshot file name, derived from the app name at creation
    pub screenshot: Option<String>,

    /// Owning user; nullable while the app is under construction
    pub user_id: Option<Uuid>,

    /// Last-writer-wins pointer at the currently active subscription,
    /// maintained only inside the activation transaction
    pub current_subscription_id: Option<Uuid>,

    /// Timestamp when the app was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the app was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscription,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Owned for Model {
    const KIND: &'static str = "app";

    fn resource_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        self.user_id
    }
}
