//! Feature contract of the travel-time model.
//!
//! A hop is described by four features. The two stop ids are categorical:
//! opaque discrete keys with one level per stop. Distance and departure
//! minute are continuous. Non-finite continuous values are read as zero,
//! both when training and when predicting.

use std::collections::HashMap;

use crate::domain::StopId;

/// One model input row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub origin: StopId,
    pub destination: StopId,
    pub distance_km: f64,
    pub departure_minute: f64,
}

impl FeatureRow {
    pub fn new(
        origin: StopId,
        destination: StopId,
        distance_km: f64,
        departure_minute: f64,
    ) -> Self {
        Self {
            origin,
            destination,
            distance_km,
            departure_minute,
        }
    }
}

/// Input columns, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Origin,
    Destination,
    DistanceKm,
    DepartureMinute,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Origin,
        Feature::Destination,
        Feature::DistanceKm,
        Feature::DepartureMinute,
    ];

    pub fn is_categorical(self) -> bool {
        matches!(self, Feature::Origin | Feature::Destination)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A row after categorical encoding.
///
/// A stop id never seen during training encodes to `None`; every
/// categorical split sends `None` to its right branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EncodedRow {
    pub origin: Option<u32>,
    pub destination: Option<u32>,
    pub distance_km: f64,
    pub departure_minute: f64,
}

impl EncodedRow {
    pub fn category(&self, feature: Feature) -> Option<u32> {
        match feature {
            Feature::Origin => self.origin,
            Feature::Destination => self.destination,
            _ => None,
        }
    }

    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::DistanceKm => self.distance_km,
            Feature::DepartureMinute => self.departure_minute,
            _ => 0.0,
        }
    }
}

/// Maps stop ids to dense category codes.
#[derive(Debug, Clone, Default)]
pub(crate) struct CategoryEncoder {
    codes: HashMap<StopId, u32>,
}

impl CategoryEncoder {
    /// Assign codes to every stop id in the rows, in first-seen order.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let mut codes = HashMap::new();
        for row in rows {
            for id in [&row.origin, &row.destination] {
                let next = codes.len() as u32;
                codes.entry(id.clone()).or_insert(next);
            }
        }
        Self { codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn encode(&self, row: &FeatureRow) -> EncodedRow {
        EncodedRow {
            origin: self.codes.get(&row.origin).copied(),
            destination: self.codes.get(&row.destination).copied(),
            distance_km: zero_filled(row.distance_km),
            departure_minute: zero_filled(row.departure_minute),
        }
    }
}

fn zero_filled(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
