//! Reading types produced by the habitat sensor.
//!
//! A reading is a fixed set of six environmental fields, always in the same
//! order. Values are synthetic and already rounded to two decimals.

use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Prefix shared by every sensor key.
pub const FIELD_PREFIX: &str = "mars_base_";

/// One of the six environmental fields reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    InternalTemperature,
    ExternalTemperature,
    InternalHumidity,
    ExternalIlluminance,
    InternalCo2,
    InternalOxygen,
}

impl SensorField {
    /// All fields, in report order.
    pub const ALL: [SensorField; 6] = [
        SensorField::InternalTemperature,
        SensorField::ExternalTemperature,
        SensorField::InternalHumidity,
        SensorField::ExternalIlluminance,
        SensorField::InternalCo2,
        SensorField::InternalOxygen,
    ];

    /// Key used in reports, settings files and averages.
    pub fn key(self) -> &'static str {
        match self {
            SensorField::InternalTemperature => "mars_base_internal_temperature",
            SensorField::ExternalTemperature => "mars_base_external_temperature",
            SensorField::InternalHumidity => "mars_base_internal_humidity",
            SensorField::ExternalIlluminance => "mars_base_external_illuminance",
            SensorField::InternalCo2 => "mars_base_internal_co2",
            SensorField::InternalOxygen => "mars_base_internal_oxygen",
        }
    }

    /// Closed range the synthetic value is drawn from.
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            SensorField::InternalTemperature => 18.0..=30.0,
            SensorField::ExternalTemperature => 0.0..=21.0,
            SensorField::InternalHumidity => 50.0..=60.0,
            SensorField::ExternalIlluminance => 500.0..=715.0,
            SensorField::InternalCo2 => 0.02..=0.1,
            SensorField::InternalOxygen => 4.0..=7.0,
        }
    }

    /// Human-readable label used in the mission log.
    ///
    /// Derived from the key: prefix stripped, underscores become spaces,
    /// first letter capitalised. `co2` keeps its chemical spelling.
    pub fn label(self) -> String {
        let bare = self.key().trim_start_matches(FIELD_PREFIX);
        let words: Vec<String> = bare
            .split('_')
            .map(|w| if w == "co2" { "CO2".to_string() } else { w.to_string() })
            .collect();
        let joined = words.join(" ");

        let mut chars = joined.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One synthetic snapshot of the six environmental fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    values: [f64; 6],
}

impl Reading {
    /// Build a reading from values given in [`SensorField::ALL`] order.
    pub fn from_values(values: [f64; 6]) -> Self {
        Self { values }
    }

    /// Build a reading where every field holds the same value.
    pub fn uniform(value: f64) -> Self {
        Self { values: [value; 6] }
    }

    /// Value of one field.
    pub fn get(&self, field: SensorField) -> f64 {
        self.values[field.index()]
    }

    /// Iterate over `(field, value)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorField, f64)> + '_ {
        SensorField::ALL.iter().map(move |&f| (f, self.get(f)))
    }

    /// Convert to an ordered record keyed by field key.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        for (field, value) in self.iter() {
            record.insert(field.key(), value);
        }
        record
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
