//! # Data Models
//!
//! This module contains the SeaORM entity models used throughout the
//! Appdock API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod app;
pub mod plan;
pub mod subscription;
pub mod user;

pub use app::Entity as App;
pub use plan::Entity as Plan;
pub use subscription::Entity as Subscription;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "appdock".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
