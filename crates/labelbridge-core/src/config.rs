// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.
//
// Every field defaults to the behaviour of the shipped check-in deployment, so
// an empty or missing config file prints exactly as before.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LabelBridgeError, Result};
use crate::types::{BitmapSize, LabelProfile};

/// Which vendor provider the bridge drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Direct Wi-Fi channel to a label printer.
    #[default]
    WifiLabel,
    /// Installed third-party print service.
    PrintService,
}

/// Persistent bridge settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Provider selected at startup.
    pub provider: ProviderKind,
    /// Wi-Fi label printer settings.
    pub wifi: WifiConfig,
    /// Print-service settings.
    pub service: ServiceConfig,
    /// SQLite diagnostics journal. Disabled when `None`.
    pub journal_path: Option<PathBuf>,
}

/// Settings for the direct Wi-Fi label printer provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Model names passed to vendor network discovery.
    pub discovery_models: Vec<String>,
    /// Orientation, label media and cutter behaviour for every job.
    pub label: LabelProfile,
    /// Driver scratch directory. The platform files dir is used when `None`.
    pub work_dir: Option<String>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            discovery_models: [
                "QL-1100",
                "QL-1110NWB",
                "QL-580N",
                "QL-710W",
                "QL-720NW",
                "QL-800",
                "QL-810W",
                "QL-820NWB",
                "QL-1115NWB",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            label: LabelProfile::default(),
            work_dir: None,
        }
    }
}

/// Choice indices applied to the print service's image options once a
/// printer is connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptionOverrides {
    pub size: usize,
    pub orientation: usize,
    pub margins: usize,
    pub align: usize,
    pub crop: usize,
}

impl Default for ImageOptionOverrides {
    fn default() -> Self {
        Self {
            size: 1,
            orientation: 2,
            margins: 0,
            align: 1,
            crop: 1,
        }
    }
}

impl ImageOptionOverrides {
    /// Choice index for a vendor option id, if this layout policy sets it.
    pub fn index_for(&self, option_id: &str) -> Option<usize> {
        match option_id {
            "size" => Some(self.size),
            "orientation" => Some(self.orientation),
            "margins" => Some(self.margins),
            "align" => Some(self.align),
            "crop" => Some(self.crop),
            _ => None,
        }
    }
}

/// Settings for the print-service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub image_options: ImageOptionOverrides,
    /// Replaces the geometry-derived bitmap size when set.
    pub bitmap_override: Option<BitmapSize>,
    /// Delay before the queue is re-checked after a job starts.
    pub queue_nudge_delay_ms: u64,
    pub job_title: String,
    pub mime_type: String,
    /// Directory (under the platform cache dir) for queued label images.
    pub temp_subdir: String,
    pub jpeg_quality: u8,
    /// Reply to the service's password prompt.
    pub service_password: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            image_options: ImageOptionOverrides::default(),
            bitmap_override: Some(BitmapSize::check_in_label()),
            queue_nudge_delay_ms: 3000,
            job_title: "label 1".into(),
            mime_type: "image/jpg".into(),
            temp_subdir: ".temp".into(),
            jpeg_quality: 100,
            service_password: "password".into(),
        }
    }
}

impl BridgeConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)
            .map_err(|e| LabelBridgeError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "bridge config loaded");
        Ok(config)
    }

    /// Read a JSON config file, falling back to defaults when it is missing
    /// or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "using default bridge config"
                );
                Self::default()
            }
        }
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
