//! Domain types for the metro travel-time estimator.
//!
//! These are the validated values shared by every layer: stop ids, line
//! labels and clock times. Each type enforces its invariants at
//! construction time.

mod line;
mod station;
mod time;

pub use line::LineName;
pub use station::{InvalidStopId, Stop, StopId};
pub use time::{ClockMinutes, MINUTES_PER_DAY, TimeError};
