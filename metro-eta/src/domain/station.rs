//! Stop identifiers and stop records.

use std::fmt;
use std::sync::Arc;

use geo::Point;

/// Error returned when a stop identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// Opaque identifier of a stop (one platform node on one line).
///
/// Stop ids come straight from the timetable feed and are only ever
/// compared, hashed and ordered. Cloning is cheap: the text is shared.
///
/// # Examples
///
/// ```
/// use metro_eta::domain::StopId;
///
/// let id = StopId::parse(" 42 ").unwrap();
/// assert_eq!(id.as_str(), "42");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(Arc<str>);

impl StopId {
    /// Parse a stop id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }
        Ok(StopId(Arc::from(trimmed)))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.as_str())
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stop as known to the network.
///
/// Several stops may share a display name: an interchange station is
/// modelled as one stop per line, all carrying the station's name.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    /// `None` when the feed has no usable coordinates for this stop.
    pub location: Option<Point<f64>>,
}

impl Stop {
    /// Create a stop from its id, name and optional latitude/longitude.
    pub fn new(id: StopId, name: impl Into<String>, lat: Option<f64>, lon: Option<f64>) -> Self {
        let location = match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Point::new(lon, lat))
            }
            _ => None,
        };
        Self {
            id,
            name: name.into(),
            location,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-blank id round-trips through its trimmed form
        #[test]
        fn roundtrip(s in "[A-Za-z0-9_]{1,12}") {
            let id = StopId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Blank strings are always rejected
        #[test]
        fn blank_rejected(s in "[ \t]{0,5}") {
            prop_assert!(StopId::parse(&s).is_err());
        }
    }
}
