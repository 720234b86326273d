//! Core dataset definitions: listings, training rows and raw uploaded tables.

use serde::{Deserialize, Serialize};

pub const LOCATION: &str = "location";
pub const PROPERTY_TYPE: &str = "property_type";
pub const AREA: &str = "area";
pub const BHK: &str = "bhk";
pub const BATH: &str = "bath";
pub const BALCONY: &str = "balcony";
pub const PARKING: &str = "parking";
pub const FURNISHING: &str = "furnishing";
pub const AGE: &str = "age";
pub const PRICE: &str = "price";

/// Feature columns in declaration order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    LOCATION,
    PROPERTY_TYPE,
    AREA,
    BHK,
    BATH,
    BALCONY,
    PARKING,
    FURNISHING,
    AGE,
];

/// Every column an uploaded training dataset must declare.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    LOCATION,
    PROPERTY_TYPE,
    AREA,
    BHK,
    BATH,
    BALCONY,
    PARKING,
    FURNISHING,
    AGE,
    PRICE,
];

/// One housing listing as submitted for prediction.
///
/// Categorical fields are optional; a blank cell or an absent JSON key is a
/// missing value, which the encoders treat as unseen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    pub area: f64,
    pub bhk: u32,
    pub bath: u32,
    pub balcony: u32,
    pub parking: u32,
    #[serde(default)]
    pub furnishing: Option<String>,
    pub age: u32,
}

/// A listing with its observed sale price.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureRecord,
    pub price: f64,
}

/// One data record of an uploaded table, tagged with its source line.
#[derive(Clone, Debug)]
pub struct RawRecord {
    pub line: u64,
    pub fields: Vec<String>,
}

/// Row-oriented table as read from an uploaded delimited file.
#[derive(Clone, Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Append a data record that starts on `line` of the source (1-based).
    pub fn push(&mut self, line: u64, fields: Vec<String>) {
        self.records.push(RawRecord { line, fields });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column in the header, if declared.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// A named upload handed over by the surrounding web layer.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub name: String,
    pub table: RawTable,
}

impl Dataset {
    pub fn new(name: impl Into<String>, table: RawTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}
