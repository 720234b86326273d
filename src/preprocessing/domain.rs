//! Column-oriented frames and the encoder contract used by the composer.

use crate::common::error::{HearthError, HearthResult};
use crate::data::domain::{
    FeatureRecord, AGE, AREA, BALCONY, BATH, BHK, FURNISHING, LOCATION, PARKING, PROPERTY_TYPE,
};

/// A single named column of values.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Categorical(Vec<Option<String>>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Small column store: names and columns kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. All columns must have the same length.
    pub fn push(&mut self, name: impl Into<String>, column: Column) -> HearthResult<()> {
        let name = name.into();
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(HearthError::encoding(
                    name,
                    format!("expected {} rows, got {}", first.len(), column.len()),
                ));
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> HearthResult<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| HearthError::encoding(name, "column not present"))
    }

    pub fn categorical(&self, name: &str) -> HearthResult<&[Option<String>]> {
        match self.column(name)? {
            Column::Categorical(values) => Ok(values),
            Column::Numeric(_) => Err(HearthError::encoding(name, "expected categorical values")),
        }
    }

    pub fn numeric(&self, name: &str) -> HearthResult<&[f64]> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Categorical(_) => Err(HearthError::encoding(name, "expected numeric values")),
        }
    }

    /// Copy of the frame with `name` swapped for `column`, position preserved.
    pub fn with_replaced(&self, name: &str, column: Column) -> HearthResult<Frame> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| HearthError::encoding(name, "column not present"))?;
        if column.len() != self.n_rows() {
            return Err(HearthError::encoding(name, "replacement changes row count"));
        }
        let mut out = self.clone();
        out.columns[idx] = column;
        Ok(out)
    }

    /// New frame holding only the listed columns, in the listed order.
    pub fn select(&self, names: &[&str]) -> HearthResult<Frame> {
        let mut out = Frame::new();
        for name in names {
            out.push(*name, self.column(name)?.clone())?;
        }
        Ok(out)
    }

    /// Lay out listings with the declared feature columns.
    pub fn from_records(records: &[FeatureRecord]) -> Frame {
        fn text(records: &[FeatureRecord], f: impl Fn(&FeatureRecord) -> Option<String>) -> Column {
            Column::Categorical(records.iter().map(f).collect())
        }
        fn num(records: &[FeatureRecord], f: impl Fn(&FeatureRecord) -> f64) -> Column {
            Column::Numeric(records.iter().map(f).collect())
        }

        let columns = vec![
            (LOCATION, text(records, |r| r.location.clone())),
            (PROPERTY_TYPE, text(records, |r| r.property_type.clone())),
            (AREA, num(records, |r| r.area)),
            (BHK, num(records, |r| f64::from(r.bhk))),
            (BATH, num(records, |r| f64::from(r.bath))),
            (BALCONY, num(records, |r| f64::from(r.balcony))),
            (PARKING, num(records, |r| f64::from(r.parking))),
            (FURNISHING, text(records, |r| r.furnishing.clone())),
            (AGE, num(records, |r| f64::from(r.age))),
        ];

        let (names, columns) = columns
            .into_iter()
            .map(|(name, col)| (name.to_string(), col))
            .unzip();
        Frame { names, columns }
    }
}

/// Two-phase column transform: learn a state, then apply it.
///
/// `fit` must not depend on anything but the frame it is given, and `transform`
/// must leave its input untouched.
pub trait Encoder {
    type State;

    fn fit(&self, frame: &Frame) -> HearthResult<Self::State>;
    fn transform(&self, frame: &Frame, state: &Self::State) -> HearthResult<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::domain::FEATURE_COLUMNS;

    fn listing() -> FeatureRecord {
        FeatureRecord {
            location: Some("Whitefield".into()),
            property_type: Some("Apartment".into()),
            area: 1250.0,
            bhk: 2,
            bath: 2,
            balcony: 1,
            parking: 1,
            furnishing: None,
            age: 4,
        }
    }

    #[test]
    fn records_lay_out_in_declared_order() {
        let frame = Frame::from_records(&[listing(), listing()]);
        let names: Vec<&str> = frame.names().iter().map(String::as_str).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.numeric(AREA).unwrap(), &[1250.0, 1250.0]);
        assert_eq!(frame.categorical(FURNISHING).unwrap(), &[None, None]);
    }

    #[test]
    fn select_keeps_requested_order() {
        let frame = Frame::from_records(&[listing()]);
        let sub = frame.select(&[AGE, LOCATION]).unwrap();
        assert_eq!(sub.names(), &["age".to_string(), "location".to_string()]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut frame = Frame::new();
        frame.push("a", Column::Numeric(vec![1.0, 2.0])).unwrap();
        assert!(frame.push("b", Column::Numeric(vec![1.0])).is_err());
    }

    #[test]
    fn type_mismatch_is_an_encoding_error() {
        let frame = Frame::from_records(&[listing()]);
        let err = frame.numeric(LOCATION).unwrap_err();
        assert!(matches!(err, HearthError::Encoding { ref column, .. } if column == "location"));
    }
}
