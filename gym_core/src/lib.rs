#![forbid(unsafe_code)]

//! Core domain model and business logic for the IronCore gym tracker.
//!
//! This crate provides:
//! - Domain types (exercises, plans, members, workouts)
//! - The exercise catalog and its category/level index
//! - Goal mapping and the recommendation engine
//! - Occupancy tracking
//! - Leaderboard and distribution reports
//! - Persistence of the member database and occupancy snapshot

pub mod types;
pub mod error;
pub mod catalog;
pub mod index;
pub mod goals;
pub mod engine;
pub mod occupancy;
pub mod report;
pub mod members;
pub mod equipment;
pub mod store;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use index::{get_default_index, ExerciseIndex};
pub use goals::{get_default_goals, GoalMap};
pub use engine::{recommend, RecommendationEngine};
pub use occupancy::{
    occupancy_status, OccupancyEvent, OccupancySnapshot, OccupancyState, OccupancyStatus,
    OccupancyTracker, SharedOccupancy, MAX_CAPACITY,
};
pub use report::{distribution, leaderboard, DistributionReport, LeaderboardEntry};
pub use store::Database;
pub use config::Config;
