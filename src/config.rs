//! Dashboard configuration loaded from an optional TOML file.
//!
//! ```toml
//! [data]
//! path = "final_data.csv"
//! recompute_categories = false
//!
//! [thresholds.potential]
//! moderate = 0.33
//! high = 0.66
//!
//! [thresholds.performance]
//! moderate = 3.0
//! high = 4.0
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ninebox.toml";

/// Data file read when neither the config nor the CLI names one.
pub const DEFAULT_DATA_FILE: &str = "final_data.csv";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Source table (.csv, .json or .parquet).
    pub path: PathBuf,
    /// Ignore the precomputed `box_category` column and re-bucket every row.
    pub recompute_categories: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_FILE),
            recompute_categories: false,
        }
    }
}

/// Cut points for the 3×3 partition used by [`crate::data::classify::bucket`].
///
/// Each cut falls back to its own dimension's default when omitted, so a
/// table naming only `high` keeps the default `moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ThresholdsFile")]
pub struct Thresholds {
    pub potential: TierCuts,
    pub performance: TierCuts,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            potential: TierCuts {
                moderate: 0.33,
                high: 0.66,
            },
            performance: TierCuts {
                moderate: 3.0,
                high: 4.0,
            },
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.potential.validate("potential")?;
        self.performance.validate("performance")
    }
}

/// Lower bounds (inclusive) of the Moderate and High tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCuts {
    pub moderate: f64,
    pub high: f64,
}

/// `[thresholds]` as written in the file, every cut optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdsFile {
    potential: CutsFile,
    performance: CutsFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CutsFile {
    moderate: Option<f64>,
    high: Option<f64>,
}

impl CutsFile {
    fn or(self, defaults: TierCuts) -> TierCuts {
        TierCuts {
            moderate: self.moderate.unwrap_or(defaults.moderate),
            high: self.high.unwrap_or(defaults.high),
        }
    }
}

impl From<ThresholdsFile> for Thresholds {
    fn from(file: ThresholdsFile) -> Self {
        let defaults = Thresholds::default();
        Thresholds {
            potential: file.potential.or(defaults.potential),
            performance: file.performance.or(defaults.performance),
        }
    }
}

impl TierCuts {
    fn validate(&self, dimension: &'static str) -> Result<(), ConfigError> {
        if !self.moderate.is_finite() || !self.high.is_finite() {
            return Err(ConfigError::Thresholds {
                dimension,
                message: "cut points must be finite numbers".to_string(),
            });
        }
        if self.moderate > self.high {
            return Err(ConfigError::Thresholds {
                dimension,
                message: format!(
                    "moderate ({}) must not exceed high ({})",
                    self.moderate, self.high
                ),
            });
        }
        Ok(())
    }
}

impl DashboardConfig {
    /// Load the configuration.
    ///
    /// * `Some(path)` – the file must exist and parse.
    /// * `None` – use [`DEFAULT_CONFIG_FILE`] if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
                    Self::default()
                }
            }
        };
        config.thresholds.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let cfg = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let cfg = DashboardConfig::from_toml_str(
            r#"
            [data]
            recompute_categories = true

            [thresholds.potential]
            moderate = 0.4
            high = 0.7
            "#,
        )
        .unwrap();

        assert!(cfg.data.recompute_categories);
        assert_eq!(cfg.data.path, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(cfg.thresholds.potential.moderate, 0.4);
        assert_eq!(cfg.thresholds.performance, Thresholds::default().performance);
    }

    #[test]
    fn single_cut_keeps_the_other_default() {
        let cfg = DashboardConfig::from_toml_str("[thresholds.potential]\nhigh = 0.7").unwrap();
        assert_eq!(
            cfg.thresholds.potential,
            TierCuts {
                moderate: 0.33,
                high: 0.7
            }
        );
        assert_eq!(cfg.thresholds.performance, Thresholds::default().performance);

        let cfg = DashboardConfig::from_toml_str("[thresholds.performance]\nmoderate = 2.5").unwrap();
        assert_eq!(cfg.thresholds.performance.moderate, 2.5);
        assert_eq!(cfg.thresholds.performance.high, 4.0);
        assert_eq!(cfg.thresholds.potential, Thresholds::default().potential);
    }

    #[test]
    fn inverted_cuts_are_rejected() {
        let thresholds = Thresholds {
            performance: TierCuts {
                moderate: 4.5,
                high: 3.0,
            },
            ..Thresholds::default()
        };
        let err = thresholds.validate().unwrap_err();
        assert!(err.to_string().contains("performance"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            DashboardConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn explicit_file_is_read_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ninebox.toml");
        std::fs::write(&path, "[thresholds.potential]\nmoderate = 0.9\nhigh = 0.1\n").unwrap();
        assert!(matches!(
            DashboardConfig::load(Some(&path)),
            Err(ConfigError::Thresholds { dimension: "potential", .. })
        ));
    }
}
