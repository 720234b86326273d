//! Column-wise composition of encoders into one numeric feature matrix.
//!
//! Output layout is fixed at fit time: every step's columns in step order,
//! then the passthrough columns in declared order.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::common::error::{HearthError, HearthResult};
use crate::data::domain::{AGE, AREA, BALCONY, BATH, BHK, FURNISHING, LOCATION, PARKING, PROPERTY_TYPE};

use super::domain::{Column, Encoder, Frame};
use super::encoders::{
    FrequencyEncoder, FrequencyTable, FurnishingEncoder, FurnishingTable, OneHotEncoder, Vocabulary,
};

/// A transform bound to the column it reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnTransform {
    OneHot(OneHotEncoder),
    Frequency(FrequencyEncoder),
    Furnishing(FurnishingEncoder),
}

impl ColumnTransform {
    pub fn column(&self) -> &str {
        match self {
            ColumnTransform::OneHot(enc) => enc.column(),
            ColumnTransform::Frequency(enc) => enc.column(),
            ColumnTransform::Furnishing(enc) => enc.column(),
        }
    }

    fn fit(&self, frame: &Frame) -> HearthResult<FittedStep> {
        let selected = frame.select(&[self.column()])?;
        Ok(match self {
            ColumnTransform::OneHot(enc) => FittedStep::OneHot {
                vocabulary: enc.fit(&selected)?,
                encoder: enc.clone(),
            },
            ColumnTransform::Frequency(enc) => FittedStep::Frequency {
                table: enc.fit(&selected)?,
                encoder: enc.clone(),
            },
            ColumnTransform::Furnishing(enc) => FittedStep::Furnishing {
                table: enc.fit(&selected)?,
                encoder: enc.clone(),
            },
        })
    }
}

/// Unfitted composer: ordered steps plus numeric passthrough columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Preprocessor {
    steps: Vec<ColumnTransform>,
    passthrough: Vec<String>,
}

impl Preprocessor {
    pub fn new(steps: Vec<ColumnTransform>, passthrough: Vec<String>) -> Self {
        Self { steps, passthrough }
    }

    /// Layout used for housing listings.
    pub fn housing() -> Self {
        Self::new(
            vec![
                ColumnTransform::OneHot(OneHotEncoder::new(LOCATION)),
                ColumnTransform::Frequency(FrequencyEncoder::new(PROPERTY_TYPE)),
                ColumnTransform::Furnishing(FurnishingEncoder::new(FURNISHING)),
            ],
            [AREA, BHK, BATH, BALCONY, PARKING, AGE]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )
    }

    pub fn fit(&self, frame: &Frame) -> HearthResult<FittedPreprocessor> {
        let steps = self
            .steps
            .iter()
            .map(|step| step.fit(frame))
            .collect::<HearthResult<Vec<_>>>()?;

        for name in &self.passthrough {
            frame.numeric(name)?;
        }

        let mut output_names: Vec<String> = Vec::new();
        for step in &steps {
            output_names.extend(step.output_names());
        }
        output_names.extend(self.passthrough.iter().cloned());

        Ok(FittedPreprocessor {
            steps,
            passthrough: self.passthrough.clone(),
            output_names,
        })
    }
}

/// A step together with the state it learned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FittedStep {
    OneHot {
        encoder: OneHotEncoder,
        vocabulary: Vocabulary,
    },
    Frequency {
        encoder: FrequencyEncoder,
        table: FrequencyTable,
    },
    Furnishing {
        encoder: FurnishingEncoder,
        table: FurnishingTable,
    },
}

impl FittedStep {
    fn output_names(&self) -> Vec<String> {
        match self {
            FittedStep::OneHot {
                encoder,
                vocabulary,
            } => encoder.output_names(vocabulary),
            FittedStep::Frequency { encoder, .. } => vec![encoder.column().to_string()],
            FittedStep::Furnishing { encoder, .. } => vec![encoder.column().to_string()],
        }
    }

    fn transform(&self, frame: &Frame) -> HearthResult<Frame> {
        match self {
            FittedStep::OneHot {
                encoder,
                vocabulary,
            } => encoder.transform(&frame.select(&[encoder.column()])?, vocabulary),
            FittedStep::Frequency { encoder, table } => {
                encoder.transform(&frame.select(&[encoder.column()])?, table)
            }
            FittedStep::Furnishing { encoder, table } => {
                encoder.transform(&frame.select(&[encoder.column()])?, table)
            }
        }
    }
}

/// Fitted composer. Immutable; transforms always produce `output_names()` columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    steps: Vec<FittedStep>,
    passthrough: Vec<String>,
    output_names: Vec<String>,
}

impl FittedPreprocessor {
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn n_features_out(&self) -> usize {
        self.output_names.len()
    }

    pub fn steps(&self) -> &[FittedStep] {
        &self.steps
    }

    /// Encode a frame into a row-major feature matrix.
    pub fn transform(&self, frame: &Frame) -> HearthResult<Array2<f64>> {
        let n_rows = frame.n_rows();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.output_names.len());

        for step in &self.steps {
            let encoded = step.transform(frame)?;
            for (name, column) in encoded.iter() {
                match column {
                    Column::Numeric(values) => columns.push(values.clone()),
                    Column::Categorical(_) => {
                        return Err(HearthError::encoding(name, "step produced non-numeric output"))
                    }
                }
            }
        }
        for name in &self.passthrough {
            columns.push(frame.numeric(name)?.to_vec());
        }

        if columns.len() != self.output_names.len() {
            return Err(HearthError::internal(format!(
                "feature layout drifted: fitted {} columns, produced {}",
                self.output_names.len(),
                columns.len()
            )));
        }
        Ok(Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| {
            columns[c][r]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::domain::FeatureRecord;
    use crate::data::service::{parse_rows, read_csv};

    fn listing(location: &str, property_type: &str, furnishing: Option<&str>, area: f64) -> FeatureRecord {
        FeatureRecord {
            location: Some(location.into()),
            property_type: Some(property_type.into()),
            area,
            bhk: 2,
            bath: 1,
            balcony: 1,
            parking: 0,
            furnishing: furnishing.map(str::to_string),
            age: 7,
        }
    }

    fn training_frame() -> Frame {
        Frame::from_records(&[
            listing("Whitefield", "Apartment", Some("Semi-Furnished"), 1100.0),
            listing("Hebbal", "Villa", Some("Fully-Furnished"), 2600.0),
            listing("Whitefield", "Apartment", None, 950.0),
        ])
    }

    #[test]
    fn layout_is_one_hot_then_frequency_then_furnishing_then_passthrough() {
        let fitted = Preprocessor::housing().fit(&training_frame()).unwrap();
        let expected: Vec<String> = [
            "location=Hebbal",
            "location=Whitefield",
            "property_type",
            "furnishing",
            "area",
            "bhk",
            "bath",
            "balcony",
            "parking",
            "age",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(fitted.output_names(), expected.as_slice());
    }

    #[test]
    fn transform_encodes_each_block() {
        let fitted = Preprocessor::housing().fit(&training_frame()).unwrap();
        let x = fitted.transform(&training_frame()).unwrap();
        assert_eq!(x.dim(), (3, 10));
        assert_eq!(x.row(0).to_vec(), vec![0.0, 1.0, 2.0, 1.0, 1100.0, 2.0, 1.0, 1.0, 0.0, 7.0]);
        assert_eq!(x.row(1).to_vec(), vec![1.0, 0.0, 1.0, 2.0, 2600.0, 2.0, 1.0, 1.0, 0.0, 7.0]);
        assert_eq!(x.row(2)[3], 0.0);
    }

    #[test]
    fn layout_is_stable_across_later_transforms() {
        let fitted = Preprocessor::housing().fit(&training_frame()).unwrap();
        let names_at_fit = fitted.output_names().to_vec();

        let unseen = Frame::from_records(&[listing("Yelahanka", "Penthouse", Some("garage"), 4000.0)]);
        let x = fitted.transform(&unseen).unwrap();

        assert_eq!(fitted.output_names(), names_at_fit.as_slice());
        assert_eq!(x.ncols(), names_at_fit.len());
        assert_eq!(x.row(0).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 4000.0, 2.0, 1.0, 1.0, 0.0, 7.0]);
    }

    #[test]
    fn blank_upload_cells_are_missing_not_a_category() {
        let csv = "location,property_type,area,bhk,bath,balcony,parking,furnishing,age,price\n\
                   Whitefield,,1100,2,1,1,0,,7,90\n\
                   ,Apartment,950,2,1,1,0,,7,80\n\
                   Hebbal,,2600,2,1,1,0,,7,300\n";
        let rows = read_csv(csv.as_bytes()).and_then(|t| parse_rows(&t)).unwrap();
        let records: Vec<FeatureRecord> = rows.into_iter().map(|r| r.features).collect();
        let frame = Frame::from_records(&records);

        let fitted = Preprocessor::housing().fit(&frame).unwrap();
        assert_eq!(
            &fitted.output_names()[..3],
            &["location=Hebbal", "location=Whitefield", "property_type"]
        );

        let x = fitted.transform(&frame).unwrap();
        assert_eq!(x.row(0)[2], 0.0);
        assert_eq!(x.row(1)[2], 1.0);
        assert_eq!(&x.row(1).to_vec()[..2], &[0.0, 0.0]);
    }

    #[test]
    fn missing_selected_column_is_an_encoding_error() {
        let frame = training_frame().select(&[PROPERTY_TYPE, FURNISHING]).unwrap();
        let err = Preprocessor::housing().fit(&frame).unwrap_err();
        assert!(matches!(err, HearthError::Encoding { ref column, .. } if column == "location"));
    }

    #[test]
    fn categorical_passthrough_is_rejected() {
        let pre = Preprocessor::new(Vec::new(), vec![LOCATION.to_string()]);
        assert!(pre.fit(&training_frame()).is_err());
    }
}
