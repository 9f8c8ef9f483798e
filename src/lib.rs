//! # Appdock API Library
//!
//! This library provides the core functionality for the Appdock API
//! service: handlers, models, the subscription activation service, and
//! server configuration.

pub mod activation;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
