//! Categorical encoders: frequency, furnishing (fixed ordinal) and one-hot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::common::error::HearthResult;

use super::domain::{Column, Encoder, Frame};

/// Category -> occurrence count observed during fit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    /// Count for a value; unseen and missing values map to zero.
    pub fn count(&self, value: Option<&str>) -> f64 {
        value
            .and_then(|v| self.counts.get(v))
            .map(|c| *c as f64)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Replaces a categorical column by how often each value occurred in the fit data.
///
/// The output keeps every input column; only the encoded one changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEncoder {
    column: String,
}

impl FrequencyEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Encoder for FrequencyEncoder {
    type State = FrequencyTable;

    fn fit(&self, frame: &Frame) -> HearthResult<FrequencyTable> {
        let mut counts = BTreeMap::new();
        for value in frame.categorical(&self.column)?.iter().flatten() {
            *counts.entry(value.clone()).or_insert(0u64) += 1;
        }
        Ok(FrequencyTable { counts })
    }

    fn transform(&self, frame: &Frame, state: &FrequencyTable) -> HearthResult<Frame> {
        let encoded = frame
            .categorical(&self.column)?
            .iter()
            .map(|v| state.count(v.as_deref()))
            .collect();
        frame.with_replaced(&self.column, Column::Numeric(encoded))
    }
}

/// Fixed furnishing levels. Anything unrecognised, including a missing value, is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnishingTable;

impl FurnishingTable {
    pub fn code(&self, value: Option<&str>) -> f64 {
        match value {
            Some("Fully-Furnished") => 2.0,
            Some("Semi-Furnished") => 1.0,
            _ => 0.0,
        }
    }
}

/// Ordinal furnishing encoder. Emits only the encoded column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FurnishingEncoder {
    column: String,
}

impl FurnishingEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Encoder for FurnishingEncoder {
    type State = FurnishingTable;

    fn fit(&self, _frame: &Frame) -> HearthResult<FurnishingTable> {
        Ok(FurnishingTable)
    }

    fn transform(&self, frame: &Frame, state: &FurnishingTable) -> HearthResult<Frame> {
        let encoded = frame
            .categorical(&self.column)?
            .iter()
            .map(|v| state.code(v.as_deref()))
            .collect();
        let mut out = Frame::new();
        out.push(self.column.clone(), Column::Numeric(encoded))?;
        Ok(out)
    }
}

/// Sorted categories observed during fit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    categories: Vec<String>,
}

impl Vocabulary {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// One indicator column per fitted category. Unknown values encode as all zeros.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    column: String,
}

impl OneHotEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Output column names for a fitted vocabulary, e.g. `location=Whitefield`.
    pub fn output_names(&self, vocabulary: &Vocabulary) -> Vec<String> {
        vocabulary
            .categories
            .iter()
            .map(|c| format!("{}={}", self.column, c))
            .collect()
    }
}

impl Encoder for OneHotEncoder {
    type State = Vocabulary;

    fn fit(&self, frame: &Frame) -> HearthResult<Vocabulary> {
        let categories: BTreeSet<&String> =
            frame.categorical(&self.column)?.iter().flatten().collect();
        Ok(Vocabulary {
            categories: categories.into_iter().cloned().collect(),
        })
    }

    fn transform(&self, frame: &Frame, state: &Vocabulary) -> HearthResult<Frame> {
        let values = frame.categorical(&self.column)?;
        let mut indicators = vec![vec![0.0; values.len()]; state.categories.len()];
        for (row, value) in values.iter().enumerate() {
            if let Some(pos) = value.as_deref().and_then(|v| state.position(v)) {
                indicators[pos][row] = 1.0;
            }
        }

        let mut out = Frame::new();
        for (name, column) in self.output_names(state).into_iter().zip(indicators) {
            out.push(name, Column::Numeric(column))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(name: &str, values: &[Option<&str>]) -> Frame {
        let mut frame = Frame::new();
        frame
            .push(
                name,
                Column::Categorical(values.iter().map(|v| v.map(str::to_string)).collect()),
            )
            .unwrap();
        frame
    }

    #[test]
    fn frequency_counts_seen_values_and_zeroes_unseen() {
        let enc = FrequencyEncoder::new("property_type");
        let train = frame_of(
            "property_type",
            &[Some("Apartment"), Some("Villa"), Some("Apartment"), Some("Apartment")],
        );
        let table = enc.fit(&train).unwrap();

        let probe = frame_of("property_type", &[Some("Apartment"), Some("Villa"), Some("Plot"), None]);
        let out = enc.transform(&probe, &table).unwrap();
        assert_eq!(out.numeric("property_type").unwrap(), &[3.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn frequency_transform_keeps_other_columns_and_input_intact() {
        let enc = FrequencyEncoder::new("property_type");
        let mut frame = frame_of("property_type", &[Some("Villa"), Some("Villa")]);
        frame.push("area", Column::Numeric(vec![900.0, 1500.0])).unwrap();
        let before = frame.clone();

        let table = enc.fit(&frame).unwrap();
        let out = enc.transform(&frame, &table).unwrap();

        assert_eq!(frame, before);
        assert_eq!(out.n_cols(), 2);
        assert_eq!(out.names(), frame.names());
        assert_eq!(out.numeric("property_type").unwrap(), &[2.0, 2.0]);
        assert_eq!(out.numeric("area").unwrap(), &[900.0, 1500.0]);
    }

    #[test]
    fn refit_replaces_state() {
        let enc = FrequencyEncoder::new("t");
        let first = enc.fit(&frame_of("t", &[Some("a"), Some("a")])).unwrap();
        let second = enc.fit(&frame_of("t", &[Some("b")])).unwrap();
        assert_eq!(first.count(Some("a")), 2.0);
        assert_eq!(second.count(Some("a")), 0.0);
        assert_eq!(second.count(Some("b")), 1.0);
    }

    #[test]
    fn empty_fit_always_encodes_zero() {
        let enc = FrequencyEncoder::new("t");
        let table = enc.fit(&frame_of("t", &[])).unwrap();
        assert!(table.is_empty());
        let out = enc.transform(&frame_of("t", &[Some("a"), None]), &table).unwrap();
        assert_eq!(out.numeric("t").unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn furnishing_table_is_fixed() {
        let table = FurnishingTable;
        assert_eq!(table.code(Some("Fully-Furnished")), 2.0);
        assert_eq!(table.code(Some("Semi-Furnished")), 1.0);
        assert_eq!(table.code(Some("Unfurnished")), 0.0);
        assert_eq!(table.code(Some("garage")), 0.0);
        assert_eq!(table.code(Some("fully-furnished")), 0.0);
        assert_eq!(table.code(None), 0.0);
    }

    #[test]
    fn furnishing_emits_single_column_regardless_of_fit_input() {
        let enc = FurnishingEncoder::new("furnishing");
        let state = enc
            .fit(&frame_of("furnishing", &[Some("garage"), Some("garage")]))
            .unwrap();

        let mut probe = frame_of(
            "furnishing",
            &[Some("Fully-Furnished"), Some("Semi-Furnished"), Some("Unfurnished"), None],
        );
        probe.push("age", Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])).unwrap();

        let out = enc.transform(&probe, &state).unwrap();
        assert_eq!(out.n_cols(), 1);
        assert_eq!(out.numeric("furnishing").unwrap(), &[2.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn one_hot_ignores_unknown_categories() {
        let enc = OneHotEncoder::new("location");
        let vocab = enc
            .fit(&frame_of("location", &[Some("Hebbal"), Some("Whitefield"), Some("Hebbal")]))
            .unwrap();
        assert_eq!(vocab.categories(), &["Hebbal".to_string(), "Whitefield".to_string()]);

        let out = enc
            .transform(&frame_of("location", &[Some("Whitefield"), Some("Marathahalli"), None]), &vocab)
            .unwrap();
        assert_eq!(
            out.names(),
            &["location=Hebbal".to_string(), "location=Whitefield".to_string()]
        );
        assert_eq!(out.numeric("location=Hebbal").unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(out.numeric("location=Whitefield").unwrap(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn encoders_reject_numeric_input() {
        let mut frame = Frame::new();
        frame.push("t", Column::Numeric(vec![1.0])).unwrap();
        assert!(FrequencyEncoder::new("t").fit(&frame).is_err());
        assert!(FurnishingEncoder::new("t")
            .transform(&frame, &FurnishingTable)
            .is_err());
    }
}
