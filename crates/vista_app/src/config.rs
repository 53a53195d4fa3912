//! Demo configuration, loaded from an optional TOML file.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! overrides:
//!
//! ```toml
//! [scene]
//! instances = 500
//! seed = 7
//!
//! [culling]
//! capacity = 256
//! gpu = true
//! ```
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vista_core::ScatterLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vista".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Total instances, the two fixed animated ones included.
    pub instances: usize,
    pub spread: f32,
    pub height: f32,
    pub materials: u32,
    /// Seed for the random layout; a fresh layout every run when absent.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let layout = ScatterLayout::default();
        Self {
            instances: layout.count,
            spread: layout.spread,
            height: layout.height,
            materials: layout.materials,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn layout(&self) -> ScatterLayout {
        ScatterLayout {
            count: self.instances,
            spread: self.spread,
            height: self.height,
            materials: self.materials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Entries in each compacted instance buffer.
    pub capacity: usize,
    /// Start on the GPU path.
    pub gpu: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            gpu: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        log::LevelFilter::from_str(&self.level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level `{}`", self.level)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub culling: CullingConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if self.culling.capacity == 0 {
            return Err(ConfigError::Invalid("culling.capacity must be at least 1".into()));
        }
        for (name, value) in [("scene.spread", self.scene.spread), ("scene.height", self.scene.height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be a finite, non-negative number")));
            }
        }
        if self.scene.materials == 0 {
            return Err(ConfigError::Invalid("scene.materials must be at least 1".into()));
        }
        self.log.level_filter()?;
        Ok(())
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.window.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.window.vsync = vsync;
        self
    }
}
