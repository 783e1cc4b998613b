//! Service configuration loaded from TOML.
//!
//! Every tunable (glucose thresholds, default query windows, bind address)
//! lives here as an operator-editable value with defaults matching the
//! clinical conventions the dashboard ships with.
//!
//! ## Loading order
//!
//! 1. `VITALBOARD_CONFIG` environment variable (path to a TOML file)
//! 2. `vitalboard.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is passed explicitly into the API state rather than
//! held in a process-wide global, so tests and embedders can run several
//! differently-configured instances side by side.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Root configuration for a vitalboard deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalboardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub glucose: GlucoseConfig,

    #[serde(default)]
    pub windows: WindowConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server.
    #[serde(default = "default_addr")]
    pub addr: String,
}

/// Default glucose target band. The very-low (<54 mg/dL) and very-high
/// (>250 mg/dL) boundaries are fixed clinical constants and intentionally
/// not configurable — see [`crate::engine::range`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlucoseConfig {
    /// Readings strictly below this are "low" (mg/dL).
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,

    /// Readings strictly above this are "high" (mg/dL).
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,
}

/// Default date windows applied when a query omits `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Default range for daily series queries, in days.
    #[serde(default = "default_range_days")]
    pub default_range_days: i64,

    /// Default AGP window, in days.
    #[serde(default = "default_agp_days")]
    pub agp_days: i64,

    /// Default correlation window, in days.
    #[serde(default = "default_correlation_days")]
    pub correlation_days: i64,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_low_threshold() -> f64 {
    70.0
}

fn default_high_threshold() -> f64 {
    180.0
}

fn default_range_days() -> i64 {
    7
}

fn default_agp_days() -> i64 {
    14
}

fn default_correlation_days() -> i64 {
    90
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

impl Default for GlucoseConfig {
    fn default() -> Self {
        Self {
            low_threshold: default_low_threshold(),
            high_threshold: default_high_threshold(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_range_days: default_range_days(),
            agp_days: default_agp_days(),
            correlation_days: default_correlation_days(),
        }
    }
}

impl VitalboardConfig {
    /// Load configuration using the documented search order.
    ///
    /// A missing file falls through to defaults; a present-but-invalid file
    /// is logged and also falls through, so a typo never takes the service
    /// down at startup.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("VITALBOARD_CONFIG") {
            if let Some(cfg) = Self::from_file(Path::new(&path)) {
                info!(path = %path, "Loaded config from VITALBOARD_CONFIG");
                return cfg;
            }
            warn!(path = %path, "VITALBOARD_CONFIG set but unreadable — using defaults");
            return Self::default();
        }

        let local = Path::new("vitalboard.toml");
        if local.exists() {
            if let Some(cfg) = Self::from_file(local) {
                info!("Loaded config from ./vitalboard.toml");
                return cfg;
            }
            warn!("./vitalboard.toml present but invalid — using defaults");
        }

        Self::default()
    }

    fn from_file(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config TOML");
                None
            }
        }
    }
}
