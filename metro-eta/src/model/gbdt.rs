//! Gradient-boosted regression model for hop durations.

use tracing::{debug, info};

use super::bins::BinnedData;
use super::config::BoostConfig;
use super::error::ModelError;
use super::feature::{CategoryEncoder, EncodedRow, FeatureRow};
use super::tree::{RegressionTree, grow};
use super::DurationModel;

/// A trained ensemble of regression trees.
///
/// Immutable once trained; prediction is pure, so a single model can be
/// shared by any number of readers.
#[derive(Debug, Clone)]
pub struct Model {
    encoder: CategoryEncoder,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl Model {
    /// Fit the model to `rows` and their observed durations.
    ///
    /// Squared-error boosting: start from the mean label and repeatedly fit
    /// a tree to the residuals. Training stops early once a round cannot
    /// split at all.
    pub fn train(
        rows: &[FeatureRow],
        labels: &[f64],
        config: &BoostConfig,
    ) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        validate(config)?;

        let labels: Vec<f64> = labels
            .iter()
            .map(|&y| if y.is_finite() { y } else { 0.0 })
            .collect();
        let encoder = CategoryEncoder::fit(rows);
        let encoded: Vec<EncodedRow> = rows.iter().map(|row| encoder.encode(row)).collect();
        let data = BinnedData::new(&encoded, encoder.len(), config.max_bins);

        let base_score = labels.iter().sum::<f64>() / labels.len() as f64;
        let mut predictions = vec![base_score; labels.len()];
        let mut residuals = vec![0.0; labels.len()];
        let mut trees = Vec::with_capacity(config.num_rounds);

        for round in 1..=config.num_rounds {
            for ((residual, label), prediction) in
                residuals.iter_mut().zip(&labels).zip(&predictions)
            {
                *residual = label - prediction;
            }

            let tree = grow(&data, &residuals, config);
            for (prediction, row) in predictions.iter_mut().zip(&encoded) {
                *prediction += tree.predict(row);
            }
            let leaves = tree.num_leaves();
            trees.push(tree);

            if config.log_every > 0 && round % config.log_every == 0 {
                debug!(
                    round,
                    leaves,
                    rmse = rmse(&predictions, &labels),
                    "Boosting progress"
                );
            }
            if leaves == 1 {
                debug!(round, "No further splits possible, stopping early");
                break;
            }
        }

        info!(
            rows = rows.len(),
            stops = encoder.len(),
            trees = trees.len(),
            rmse = rmse(&predictions, &labels),
            "Trained travel-time model"
        );

        Ok(Self {
            encoder,
            base_score,
            trees,
        })
    }

    /// Predicted duration in minutes for each row.
    pub fn predict(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Predicted duration in minutes for one row.
    ///
    /// Stops not seen in training are routed down the "other" branch of
    /// every categorical split; the result is a best-effort estimate.
    pub fn predict_one(&self, row: &FeatureRow) -> f64 {
        let encoded = self.encoder.encode(row);
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(&encoded))
                .sum::<f64>()
    }

    /// Number of trees in the ensemble.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl DurationModel for Model {
    fn predict_minutes(&self, row: &FeatureRow) -> f64 {
        self.predict_one(row)
    }
}

fn validate(config: &BoostConfig) -> Result<(), ModelError> {
    if config.num_rounds == 0 {
        return Err(ModelError::InvalidConfig("num_rounds must be positive"));
    }
    if config.num_leaves < 2 {
        return Err(ModelError::InvalidConfig("num_leaves must be at least 2"));
    }
    if !(config.learning_rate > 0.0 && config.learning_rate.is_finite()) {
        return Err(ModelError::InvalidConfig("learning_rate must be positive"));
    }
    Ok(())
}

fn rmse(predictions: &[f64], labels: &[f64]) -> f64 {
    let squared: f64 = predictions
        .iter()
        .zip(labels)
        .map(|(p, y)| (p - y) * (p - y))
        .sum();
    (squared / labels.len() as f64).sqrt()
}
