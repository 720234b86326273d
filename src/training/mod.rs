//! Training domain: the regression forest, pipeline fitting and artifact storage.

pub mod domain;
pub mod forest;
pub mod repo_fs;
pub mod service;

pub use domain::{ArtifactStore, FittedPipeline, TrainConfig, TrainingRun};
pub use repo_fs::FsArtifactStore;
