//! Feature preprocessing: frames, categorical encoders and the column composer.

pub mod composer;
pub mod domain;
pub mod encoders;

pub use composer::{ColumnTransform, FittedPreprocessor, Preprocessor};
pub use domain::{Column, Encoder, Frame};
pub use encoders::{FrequencyEncoder, FurnishingEncoder, OneHotEncoder};
