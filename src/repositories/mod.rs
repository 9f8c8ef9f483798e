//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with owner-scoped methods.

pub mod app;
pub mod plan;
pub mod subscription;
pub mod user;

pub use app::{AppRepository, CreateAppRequest, UpdateAppRequest};
pub use plan::{CreatePlanRequest, PlanRepository};
pub use subscription::SubscriptionRepository;
pub use user::{CreateUserRequest, UserRepository};
