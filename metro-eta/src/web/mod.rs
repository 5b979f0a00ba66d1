//! Web layer for the metro travel-time estimator.
//!
//! Serves the station list and journey estimates as JSON, plus a single
//! HTML page that uses them.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
