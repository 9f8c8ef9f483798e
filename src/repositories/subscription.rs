//! # Subscription Repository
//!
//! This module contains read-side repository operations for Subscription
//! entities. All writes go through the activation service, which owns the
//! transactional supersession logic.

use crate::error::RepositoryError;
use crate::models::subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

/// Repository for Subscription database operations
pub struct SubscriptionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new SubscriptionRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get subscription by ID
    pub async fn find_by_id(
        &self,
        subscription_id: Uuid,
    ) -> Result<Option<SubscriptionModel>, RepositoryError> {
        let subscription = Subscription::find_by_id(subscription_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(subscription)
    }

    /// List all subscriptions owned by the given user, superseded ones
    /// included
    pub async fn list_by_owner(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionModel>, RepositoryError> {
        let subscriptions = Subscription::find()
            .filter(SubscriptionColumn::UserId.eq(user_id))
            .order_by_asc(SubscriptionColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(subscriptions)
    }
}
