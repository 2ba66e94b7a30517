//! Census data model: one record per (year, neighbourhood) pair.

use serde::{Deserialize, Serialize};

/// The eight housing forms tracked by the census, in source column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellingType {
    SingleDetachedHouse,
    ApartmentFiveStoreysPlus,
    MovableDwelling,
    SemiDetachedHouse,
    RowHouse,
    Duplex,
    ApartmentFiveStoreysLess,
    OtherHouse,
}

impl DwellingType {
    pub const ALL: [DwellingType; 8] = [
        DwellingType::SingleDetachedHouse,
        DwellingType::ApartmentFiveStoreysPlus,
        DwellingType::MovableDwelling,
        DwellingType::SemiDetachedHouse,
        DwellingType::RowHouse,
        DwellingType::Duplex,
        DwellingType::ApartmentFiveStoreysLess,
        DwellingType::OtherHouse,
    ];

    /// Column name used in the census CSV and in exported files.
    pub fn column(self) -> &'static str {
        match self {
            DwellingType::SingleDetachedHouse => "single_detached_house",
            DwellingType::ApartmentFiveStoreysPlus => "apartment_five_storeys_plus",
            DwellingType::MovableDwelling => "movable_dwelling",
            DwellingType::SemiDetachedHouse => "semi_detached_house",
            DwellingType::RowHouse => "row_house",
            DwellingType::Duplex => "duplex",
            DwellingType::ApartmentFiveStoreysLess => "apartment_five_storeys_less",
            DwellingType::OtherHouse => "other_house",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Unit counts for every dwelling type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DwellingCounts([u64; 8]);

impl DwellingCounts {
    pub fn get(&self, kind: DwellingType) -> u64 {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: DwellingType, units: u64) {
        self.0[kind.index()] = units;
    }

    /// Builder-style setter, handy when only a few types are non-zero.
    pub fn with(mut self, kind: DwellingType, units: u64) -> Self {
        self.set(kind, units);
        self
    }

    /// Adds every count of `other` into `self`, saturating at `u64::MAX`.
    pub fn accumulate(&mut self, other: &DwellingCounts) {
        for (total, units) in self.0.iter_mut().zip(other.0.iter()) {
            *total = total.saturating_add(*units);
        }
    }

    /// Iterates `(type, units)` pairs in source column order.
    pub fn iter(&self) -> impl Iterator<Item = (DwellingType, u64)> + '_ {
        DwellingType::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |sum, units| sum.saturating_add(*units))
    }
}

impl Serialize for DwellingCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(DwellingType::ALL.len()))?;
        for (kind, units) in self.iter() {
            map.serialize_entry(kind.column(), &units)?;
        }
        map.end()
    }
}

/// One census row for a neighbourhood in a given year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensusRecord {
    pub year: i32,
    pub neighbourhood: String,
    pub dwellings: DwellingCounts,
    pub shelter_costs_owned: f64,
    pub shelter_costs_rented: f64,
    /// `None` when the source cell was empty.
    pub average_house_value: Option<f64>,
}

impl CensusRecord {
    /// A record with zeroed counts and costs, for callers that fill fields selectively.
    pub fn new(year: i32, neighbourhood: impl Into<String>) -> Self {
        CensusRecord {
            year,
            neighbourhood: neighbourhood.into(),
            dwellings: DwellingCounts::default(),
            shelter_costs_owned: 0.0,
            shelter_costs_rented: 0.0,
            average_house_value: None,
        }
    }

    pub fn with_house_value(mut self, value: f64) -> Self {
        self.average_house_value = Some(value);
        self
    }

    pub fn with_shelter_costs(mut self, owned: f64, rented: f64) -> Self {
        self.shelter_costs_owned = owned;
        self.shelter_costs_rented = rented;
        self
    }

    pub fn with_dwellings(mut self, dwellings: DwellingCounts) -> Self {
        self.dwellings = dwellings;
        self
    }
}

/// Geographic centre of a neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodLocation {
    pub neighbourhood: String,
    pub lat: f64,
    pub lon: f64,
}
