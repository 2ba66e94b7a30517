//! Data types produced by the aggregation pipeline.

use serde::Serialize;

/// Mean monthly shelter costs for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShelterCosts {
    pub owned: f64,
    pub rented: f64,
}

/// A neighbourhood paired with a single value, used by the ranked views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourhoodValue {
    pub neighbourhood: String,
    pub value: f64,
}

impl From<(String, f64)> for NeighbourhoodValue {
    fn from((neighbourhood, value): (String, f64)) -> Self {
        NeighbourhoodValue {
            neighbourhood,
            value,
        }
    }
}

/// A map marker: neighbourhood coordinates with its mean house value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourhoodPoint {
    pub neighbourhood: String,
    pub lat: f64,
    pub lon: f64,
    pub mean_house_value: f64,
}

/// Result of joining mean values onto the location table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationJoin {
    /// Matched rows, in location-table order.
    pub points: Vec<NeighbourhoodPoint>,
    /// Neighbourhoods with a mean value but no coordinates.
    pub missing_location: Vec<String>,
    /// Neighbourhoods with coordinates but no mean value.
    pub missing_value: Vec<String>,
}

impl LocationJoin {
    pub fn unmatched(&self) -> usize {
        self.missing_location.len() + self.missing_value.len()
    }
}
