//! # Subscription Activation Service
//!
//! Maintains the per-app subscription invariants whenever a new
//! subscription is created: at most one subscription per app is active,
//! creating a subscription deactivates every previously active one for the
//! same app, and the app's current_subscription_id always points at the
//! most recently created subscription.
//!
//! The whole sequence runs inside one transaction with a row lock on the
//! app record, so two racing activations for the same app serialize and
//! the outcome equals running them one after another in some order.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::app::Entity as App;
use crate::models::plan::Entity as Plan;
use crate::models::subscription::{
    ActiveModel as SubscriptionActiveModel, Column as SubscriptionColumn, Entity as Subscription,
    Model as SubscriptionModel,
};
use crate::models::user::Entity as User;

/// Errors surfaced by the activation service.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("no user found against id {0}")]
    UserNotFound(Uuid),
    #[error("no plan found against id {0}")]
    PlanNotFound(Uuid),
    #[error("no app found against id {0}")]
    AppNotFound(Uuid),
    #[error("storage failure during activation: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl From<ActivationError> for ApiError {
    fn from(error: ActivationError) -> Self {
        match error {
            ActivationError::UserNotFound(_)
            | ActivationError::PlanNotFound(_)
            | ActivationError::AppNotFound(_) => crate::error::not_found(&error.to_string()),
            ActivationError::Storage(db_err) => db_err.into(),
        }
    }
}

/// Service owning all subscription writes.
pub struct ActivationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivationService<'a> {
    /// Create a new ActivationService over the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a subscription for `(user, plan, app)` and make it the sole
    /// active one for the app.
    ///
    /// Either every step commits or none does; a failure mid-sequence
    /// rolls the transaction back, so no partially superseded state is
    /// ever observable.
    pub async fn activate(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        app_id: Uuid,
    ) -> Result<SubscriptionModel, ActivationError> {
        let txn = self.db.begin().await?;

        // Lock the app row so concurrent activations for the same app
        // serialize. SQLite has no FOR UPDATE; its single-writer
        // transactions already serialize.
        let mut app_query = App::find_by_id(app_id);
        if txn.get_database_backend() == DbBackend::Postgres {
            app_query = app_query.lock(LockType::Update);
        }
        let app = app_query
            .one(&txn)
            .await?
            .ok_or(ActivationError::AppNotFound(app_id))?;

        if User::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(ActivationError::UserNotFound(user_id));
        }
        if Plan::find_by_id(plan_id).one(&txn).await?.is_none() {
            return Err(ActivationError::PlanNotFound(plan_id));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();

        // Deactivate every previously active row, not just the single one
        // the invariant promises; a prior violation is repaired rather
        // than crashed on.
        let deactivated = Subscription::update_many()
            .col_expr(SubscriptionColumn::Active, Expr::value(false))
            .col_expr(SubscriptionColumn::UpdatedAt, Expr::value(now))
            .filter(SubscriptionColumn::AppId.eq(app_id))
            .filter(SubscriptionColumn::Active.eq(true))
            .exec(&txn)
            .await?;

        if deactivated.rows_affected > 1 {
            warn!(
                app_id = %app_id,
                rows = deactivated.rows_affected,
                "Deactivated more than one active subscription for app"
            );
        }

        let subscription = SubscriptionActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            plan_id: Set(plan_id),
            app_id: Set(app_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active_app = app.into_active_model();
        active_app.current_subscription_id = Set(Some(subscription.id));
        active_app.updated_at = Set(now);
        active_app.update(&txn).await?;

        txn.commit().await?;

        Ok(subscription)
    }
}
