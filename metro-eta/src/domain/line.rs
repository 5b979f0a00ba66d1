//! Line labels.

use std::fmt;
use std::sync::Arc;

const TRANSFER: &str = "Transfer";
const FALLBACK: &str = "Metro";

/// Human-readable label of a metro line, e.g. "Yellow Line".
///
/// The label `"Transfer"` is reserved for in-station walks between platforms
/// and never names a real line.
///
/// # Examples
///
/// ```
/// use metro_eta::domain::LineName;
///
/// let line = LineName::from_route_long_name(Some("YELLOW_Samaypur Badli to Huda City"));
/// assert_eq!(line.as_str(), "Yellow Line");
///
/// assert_eq!(LineName::from_route_long_name(None).as_str(), "Metro");
/// assert!(LineName::transfer().is_transfer());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineName(Arc<str>);

impl LineName {
    /// Wrap an already formatted label.
    pub fn new(label: &str) -> Self {
        LineName(Arc::from(label))
    }

    /// The sentinel label carried by transfer edges.
    pub fn transfer() -> Self {
        LineName(Arc::from(TRANSFER))
    }

    /// Generic label for routes that have no long name.
    pub fn fallback() -> Self {
        LineName(Arc::from(FALLBACK))
    }

    /// Derive a line label from a route's long name.
    ///
    /// Takes the text before the first `_`, title-cases it and appends
    /// `" Line"`. Missing or blank long names map to the generic label.
    pub fn from_route_long_name(long_name: Option<&str>) -> Self {
        let Some(long_name) = long_name.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::fallback();
        };
        let token = long_name.split('_').next().unwrap_or_default();
        if token.trim().is_empty() {
            return Self::fallback();
        }
        LineName(Arc::from(format!("{} Line", title_case(token))))
    }

    /// Whether this is the transfer sentinel.
    pub fn is_transfer(&self) -> bool {
        &*self.0 == TRANSFER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

impl fmt::Debug for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineName({})", self.as_str())
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
