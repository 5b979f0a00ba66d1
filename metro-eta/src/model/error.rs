//! Model training errors.

/// Errors raised while training the travel-time model.
///
/// Prediction never fails; these only occur during initialisation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// No training rows
    #[error("cannot train on an empty training set")]
    EmptyTrainingSet,

    /// Feature rows and labels differ in length
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// Configuration cannot produce a model
    #[error("invalid boosting configuration: {0}")]
    InvalidConfig(&'static str),
}
