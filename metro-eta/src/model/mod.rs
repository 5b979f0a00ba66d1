//! Travel-time model.
//!
//! Predicts how many minutes one hop takes from its origin and destination
//! stops, its length and the time of day it starts. The model is a
//! gradient-boosted ensemble of regression trees, trained once at startup
//! and frozen afterwards.

mod bins;
mod config;
mod error;
mod feature;
mod gbdt;
mod tree;

pub use config::BoostConfig;
pub use error::ModelError;
pub use feature::{Feature, FeatureRow};
pub use gbdt::Model;

/// Anything that can estimate a hop's duration.
///
/// The route planner depends on this trait rather than on [`Model`] so that
/// it can be exercised with fixed durations in tests.
pub trait DurationModel {
    /// Predicted duration of the hop in minutes.
    fn predict_minutes(&self, row: &FeatureRow) -> f64;
}
