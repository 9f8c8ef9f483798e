//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial
//! data. Currently that is the read-only plan catalog, populated when the
//! application starts.

pub mod plan;

pub use plan::seed_plans;
