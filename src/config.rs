use std::fs;
use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::export::{ExportFormat, ExportOptions};

const CONFIG_FILE_NAME: &str = "retouch.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_limits: ImageLimits,
    pub history: HistoryConfig,
    pub export: ExportConfig,
    pub worker: WorkerConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if let Ok(contents) = fs::read_to_string(&path) {
                match Self::from_toml_str(&contents) {
                    Ok(cfg) => {
                        log::info!("Loaded config from {}", path.display());
                        return cfg;
                    }
                    Err(err) => {
                        log::warn!("Failed to parse config {}: {err}", path.display());
                    }
                }
            }
        }
        Self::default()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(contents)
    }

    pub fn effective_image_limits(&self) -> ImageLimits {
        self.image_limits.sanitized()
    }

    pub fn effective_history(&self) -> HistoryConfig {
        self.history.sanitized()
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            jpeg_quality: self.export.jpeg_quality.clamp(1, 100),
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(exe_path) = std::env::current_exe()
            && let Some(dir) = exe_path.parent()
        {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }

        if let Some(proj_dirs) = ProjectDirs::from("dev", "Retouch", "Retouch") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }

        if let Some(base_dirs) = BaseDirs::new() {
            paths.push(base_dirs.config_dir().join("retouch").join(CONFIG_FILE_NAME));
        }

        paths
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub image_dim: u32,
    pub total_pixels: u64,
    pub alloc_bytes: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            image_dim: 12_000,
            total_pixels: 80_000_000,       // ~80 MP
            alloc_bytes: 512 * 1024 * 1024, // 512 MiB
        }
    }
}

impl ImageLimits {
    pub fn sanitized(&self) -> Self {
        let dim = self.image_dim.clamp(64, 100_000);
        let pixels = self.total_pixels.clamp(1_000_000, 5_000_000_000); // 1 MP .. 5 GP
        let alloc = self
            .alloc_bytes
            .clamp(8 * 1024 * 1024, 8 * 1024 * 1024 * 1024); // 8 MiB .. 8 GiB
        Self {
            image_dim: dim,
            total_pixels: pixels,
            alloc_bytes: alloc,
        }
    }
}

/// How the engine rebuilds the document after undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomputePolicy {
    /// Fold every applied transform over the source buffer.
    Replay,
    /// Replay from the closest cached buffer at or below the target position.
    Checkpoints,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable steps; 0 keeps everything.
    pub max_depth: usize,
    pub recompute: RecomputePolicy,
    pub checkpoint_budget_bytes: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            recompute: RecomputePolicy::Replay,
            checkpoint_budget_bytes: 256 * 1024 * 1024, // 256 MiB
        }
    }
}

impl HistoryConfig {
    pub fn sanitized(&self) -> Self {
        let max_depth = if self.max_depth == 0 {
            0
        } else {
            self.max_depth.clamp(2, 10_000)
        };
        Self {
            max_depth,
            recompute: self.recompute,
            checkpoint_budget_bytes: self.checkpoint_budget_bytes.min(16 * 1024 * 1024 * 1024),
        }
    }

    pub const fn depth_limit(&self) -> Option<usize> {
        if self.max_depth == 0 {
            None
        } else {
            Some(self.max_depth)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_format: ExportFormat,
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Png,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Images with at least this many pixels are recomputed off the UI thread.
    pub background_min_pixels: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            background_min_pixels: 2_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(cfg.history.max_depth, 100);
        assert_eq!(cfg.history.recompute, RecomputePolicy::Replay);
        assert_eq!(cfg.export.default_format, ExportFormat::Png);
        assert_eq!(cfg.export.jpeg_quality, 90);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [history]
            recompute = "checkpoints"

            [export]
            default_format = "jpeg"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.history.recompute, RecomputePolicy::Checkpoints);
        assert_eq!(cfg.history.max_depth, 100);
        assert_eq!(cfg.export.default_format, ExportFormat::Jpeg);
        assert_eq!(cfg.worker.background_min_pixels, 2_000_000);
    }

    #[test]
    fn unknown_recompute_policy_is_rejected() {
        let err = AppConfig::from_toml_str("[history]\nrecompute = \"magic\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn sanitizing_clamps_pathological_values() {
        let cfg = AppConfig::from_toml_str(
            r"
            [history]
            max_depth = 1

            [export]
            jpeg_quality = 0

            [image_limits]
            image_dim = 1
            ",
        )
        .expect("parse");
        assert_eq!(cfg.effective_history().max_depth, 2);
        assert_eq!(cfg.export_options().jpeg_quality, 1);
        assert_eq!(cfg.effective_image_limits().image_dim, 64);
    }

    #[test]
    fn zero_depth_means_unbounded() {
        let cfg = AppConfig::from_toml_str("[history]\nmax_depth = 0\n").expect("parse");
        assert_eq!(cfg.effective_history().depth_limit(), None);
    }
}
