//! Engine tuning configuration.
//!
//! The active configuration is process-wide. It only steers performance
//! heuristics (method crossover, parallel thresholds, block sizing) and the
//! oversized-transform warning; it never changes numerical results beyond
//! floating-point tolerance.

use crate::error::{DspError, DspResult, DspWarning};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

/// Tunable engine parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Kernels shorter than this always use the direct algorithm under `auto`.
    #[serde(default = "default_direct_kernel_threshold")]
    pub direct_kernel_threshold: usize,

    /// Transforms longer than this are reported with a warning.
    #[serde(default = "default_max_transform_len")]
    pub max_transform_len: usize,

    /// Estimated multiply-accumulate count above which kernels fan out over
    /// the thread pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Spectral convolution switches to overlap-save blocks when the signal is
    /// at least this many times longer than the kernel.
    #[serde(default = "default_overlap_save_ratio")]
    pub overlap_save_ratio: usize,
}

fn default_direct_kernel_threshold() -> usize { 8 }
fn default_max_transform_len() -> usize { 1 << 26 }
fn default_parallel_threshold() -> usize { 1 << 15 }
fn default_overlap_save_ratio() -> usize { 64 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            direct_kernel_threshold: default_direct_kernel_threshold(),
            max_transform_len: default_max_transform_len(),
            parallel_threshold: default_parallel_threshold(),
            overlap_save_ratio: default_overlap_save_ratio(),
        }
    }
}

impl EngineConfig {
    /// Report (without failing) a transform longer than the safe threshold.
    pub fn check_transform_len(&self, len: usize) -> Option<DspWarning> {
        if len > self.max_transform_len {
            let warning = DspWarning::LargeTransform {
                len,
                limit: self.max_transform_len,
            };
            tracing::warn!("{}", warning);
            Some(warning)
        } else {
            None
        }
    }

    /// Whether `work` multiply-accumulates justify parallel execution.
    #[inline]
    pub fn is_parallel(&self, work: usize) -> bool {
        work >= self.parallel_threshold
    }
}

static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> =
    Lazy::new(|| RwLock::new(EngineConfig::default()));

fn read_config() -> RwLockReadGuard<'static, EngineConfig> {
    // Writers replace the whole value, so a poisoned lock still holds a
    // complete configuration.
    ENGINE_CONFIG.read().unwrap_or_else(|poison| poison.into_inner())
}

/// Snapshot of the active configuration.
pub fn engine_config() -> EngineConfig {
    read_config().clone()
}

/// Replace the active configuration.
pub fn set_engine_config(config: EngineConfig) -> DspResult<()> {
    validate_config(&config)?;
    tracing::debug!("Engine configuration updated: {:?}", config);
    let mut guard = ENGINE_CONFIG
        .write()
        .unwrap_or_else(|poison| poison.into_inner());
    *guard = config;
    Ok(())
}

/// Load configuration from a file.
///
/// Files ending in `.json` are parsed as JSON, anything else as TOML.
pub fn load_config(path: &Path) -> DspResult<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DspError::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

    let config: EngineConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .map_err(|e| DspError::Config(format!("Failed to parse config as JSON: {}", e)))?
    } else {
        toml::from_str(&content)
            .map_err(|e| DspError::Config(format!("Failed to parse config as TOML: {}", e)))?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration.
fn validate_config(config: &EngineConfig) -> DspResult<()> {
    if config.max_transform_len == 0 {
        return Err(DspError::Config("max_transform_len must be positive".into()));
    }
    if config.overlap_save_ratio < 2 {
        return Err(DspError::Config(format!(
            "overlap_save_ratio must be at least 2, got {}",
            config.overlap_save_ratio
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.direct_kernel_threshold, 8);
        assert_eq!(config.max_transform_len, 1 << 26);
        assert!(config.is_parallel(1 << 20));
        assert!(!config.is_parallel(16));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("direct_kernel_threshold = 32\n").unwrap();
        assert_eq!(config.direct_kernel_threshold, 32);
        assert_eq!(config.overlap_save_ratio, default_overlap_save_ratio());
    }

    #[test]
    fn test_large_transform_warning() {
        let config = EngineConfig {
            max_transform_len: 1024,
            ..Default::default()
        };
        assert_eq!(config.check_transform_len(512), None);
        assert_eq!(
            config.check_transform_len(4096),
            Some(DspWarning::LargeTransform { len: 4096, limit: 1024 })
        );
    }

    #[test]
    fn test_load_config_from_files() {
        let dir = std::env::temp_dir();

        let toml_path = dir.join(format!("lib-dsp-config-{}.toml", std::process::id()));
        std::fs::write(&toml_path, "parallel_threshold = 100\noverlap_save_ratio = 16\n").unwrap();
        let config = load_config(&toml_path).unwrap();
        assert_eq!(config.parallel_threshold, 100);
        assert_eq!(config.overlap_save_ratio, 16);
        std::fs::remove_file(&toml_path).ok();

        let json_path = dir.join(format!("lib-dsp-config-{}.json", std::process::id()));
        std::fs::write(&json_path, r#"{"overlap_save_ratio": 1}"#).unwrap();
        assert!(matches!(load_config(&json_path), Err(DspError::Config(_))));
        std::fs::remove_file(&json_path).ok();

        assert!(matches!(
            load_config(Path::new("/nonexistent/engine.toml")),
            Err(DspError::Config(_))
        ));
    }

    #[test]
    fn test_set_engine_config_validates() {
        let bad = EngineConfig {
            max_transform_len: 0,
            ..Default::default()
        };
        assert!(set_engine_config(bad).is_err());
        assert_eq!(engine_config().max_transform_len, default_max_transform_len());
    }
}
