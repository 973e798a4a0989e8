//! Settings loaded from `qgraph.toml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "qgraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub plot: PlotSettings,
}

/// Parallel generation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Worker threads; defaults to the available parallelism.
    pub threads: Option<usize>,
    /// Base seed; spec `i` grows from `seed + i`.
    pub seed: Option<u64>,
    /// How often the drain loop checks for cancellation.
    pub poll_interval_ms: u64,
    /// Give up once no task has completed for this long.
    pub task_timeout_ms: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            threads: None,
            seed: None,
            poll_interval_ms: 50,
            task_timeout_ms: None,
        }
    }
}

impl GenerationSettings {
    pub fn worker_count(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_ms.map(Duration::from_millis)
    }
}

/// Chart styling applied by `lineplot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub width: u32,
    pub height: u32,
    pub font_scale: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        // 8 x 5 inches at 80 dpi.
        Self {
            width: 640,
            height: 400,
            font_scale: 1.2,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!("Settings loaded from {}", path.display());
        Ok(settings)
    }
}
