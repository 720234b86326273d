//! Runtime configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub data_root: String,
    pub log_level: String,
    pub n_trees: usize,
    pub seed: u64,
    pub test_size: f64,
    pub artifact_name: String,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            data_root: "./data".to_string(),
            log_level: "info".to_string(),
            n_trees: 300,
            seed: 42,
            test_size: 0.2,
            artifact_name: "house_price_model.bin".to_string(),
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        fn env_or(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }

        let defaults = Self::default();
        let test_size = env_or("HEARTH_TEST_SIZE", "0.2")
            .parse::<f64>()
            .ok()
            .filter(|v| (0.0..1.0).contains(v))
            .unwrap_or(defaults.test_size);

        Self {
            data_root: env_or("HEARTH_DATA_ROOT", &defaults.data_root),
            log_level: env_or("HEARTH_LOG_LEVEL", &defaults.log_level),
            n_trees: env_or("HEARTH_N_TREES", "300")
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(defaults.n_trees),
            seed: env_or("HEARTH_SEED", "42").parse().unwrap_or(defaults.seed),
            test_size,
            artifact_name: env_or("HEARTH_ARTIFACT_NAME", &defaults.artifact_name),
        }
    }

    /// Same configuration rooted at another data directory.
    pub fn with_data_root(mut self, root: impl Into<String>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn models_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join("models")
    }

    pub fn audit_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join("audit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_training_setup() {
        let cfg = AppCfg::default();
        assert_eq!(cfg.n_trees, 300);
        assert_eq!(cfg.seed, 42);
        assert!((cfg.test_size - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn directories_hang_off_data_root() {
        let cfg = AppCfg::default().with_data_root("/srv/hearth");
        assert_eq!(cfg.models_dir(), PathBuf::from("/srv/hearth/models"));
        assert_eq!(cfg.audit_dir(), PathBuf::from("/srv/hearth/audit"));
    }
}
