//! Application state for the web layer.

use std::sync::Arc;

use crate::context::EtaContext;

/// Shared application state.
///
/// The estimator is immutable after start-up, so handlers read it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<EtaContext>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(context: EtaContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}
