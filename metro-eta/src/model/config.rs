//! Training configuration for the travel-time model.

/// Gradient boosting parameters.
///
/// The defaults are fixed, moderate values; they are not tuned per
/// deployment.
#[derive(Debug, Clone)]
pub struct BoostConfig {
    /// Number of boosting rounds (trees).
    pub num_rounds: usize,

    /// Shrinkage applied to every tree's output.
    pub learning_rate: f64,

    /// Maximum number of leaves per tree (leaf-wise growth).
    pub num_leaves: usize,

    /// Minimum number of training rows in a leaf.
    pub min_data_in_leaf: usize,

    /// Maximum number of histogram bins for continuous features.
    pub max_bins: usize,

    /// Minimum rows a category needs at a node to join a split's left set.
    pub min_data_per_category: usize,

    /// Maximum number of categories on the left side of a split.
    pub max_cat_threshold: usize,

    /// Log training RMSE every this many rounds (0 disables).
    pub log_every: usize,
}

impl BoostConfig {
    /// Create a new configuration with the given tree parameters.
    pub fn new(
        num_rounds: usize,
        learning_rate: f64,
        num_leaves: usize,
        min_data_in_leaf: usize,
    ) -> Self {
        Self {
            num_rounds,
            learning_rate,
            num_leaves,
            min_data_in_leaf,
            ..Self::default()
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            num_rounds: 300,
            learning_rate: 0.1,
            num_leaves: 31,
            min_data_in_leaf: 20,
            max_bins: 255,
            min_data_per_category: 1,
            max_cat_threshold: 32,
            log_every: 50,
        }
    }
}
