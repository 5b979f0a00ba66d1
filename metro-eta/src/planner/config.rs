//! Timing rules for itinerary planning.

/// Fixed allowances applied on top of model predictions.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Duration of a transfer edge (minutes). Transfers are never predicted.
    pub transfer_mins: f64,

    /// Wait before the first train and after every transfer (minutes).
    pub boarding_wait_mins: f64,
}

impl PlannerConfig {
    /// Create a new configuration with the given allowances.
    pub fn new(transfer_mins: f64, boarding_wait_mins: f64) -> Self {
        Self {
            transfer_mins,
            boarding_wait_mins,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            transfer_mins: 5.0,
            boarding_wait_mins: 2.5,
        }
    }
}
