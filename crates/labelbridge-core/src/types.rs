// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the label printer bridge.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier attached to one `print_bitmaps` batch for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label printer models understood by the Wi-Fi label printer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrinterModel {
    Ql1100,
    #[default]
    Ql1110Nwb,
    Ql580N,
    Ql710W,
    Ql720Nw,
    Ql800,
    Ql810W,
    Ql820Nwb,
    Ql1115Nwb,
}

impl PrinterModel {
    /// Map a host-side model selection to a driver model.
    ///
    /// Matching is exact. Strings outside the known set return `None`.
    pub fn from_selection(selection: &str) -> Option<Self> {
        match selection {
            "Brother QL-1100" => Some(Self::Ql1100),
            "Brother QL-1110NWB" => Some(Self::Ql1110Nwb),
            "Brother QL-580N" => Some(Self::Ql580N),
            "Brother QL-710W" => Some(Self::Ql710W),
            "Brother QL-720NW" => Some(Self::Ql720Nw),
            "Brother QL-800" => Some(Self::Ql800),
            "Brother QL-810W" => Some(Self::Ql810W),
            "Brother QL-820NWB" => Some(Self::Ql820Nwb),
            "Brother QL-1115NWB" => Some(Self::Ql1115Nwb),
            _ => None,
        }
    }

    /// Like [`from_selection`](Self::from_selection), but unknown strings
    /// fall back to the default model so there is always a valid profile.
    pub fn resolve(selection: &str) -> Self {
        Self::from_selection(selection).unwrap_or_default()
    }

    /// Constant name in the vendor driver's model enumeration.
    pub fn driver_name(&self) -> &'static str {
        match self {
            Self::Ql1100 => "QL_1100",
            Self::Ql1110Nwb => "QL_1110NWB",
            Self::Ql580N => "QL_580N",
            Self::Ql710W => "QL_710W",
            Self::Ql720Nw => "QL_720NW",
            Self::Ql800 => "QL_800",
            Self::Ql810W => "QL_810W",
            Self::Ql820Nwb => "QL_820NWB",
            Self::Ql1115Nwb => "QL_1115NWB",
        }
    }
}

/// Label media loaded in the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSize {
    DieCutW17H54,
    DieCutW29H90,
    DieCutW38H90,
    DieCutW62H100,
    RollW29,
    RollW62,
}

impl LabelSize {
    /// Constant name in the vendor driver's label-size enumeration.
    pub fn driver_name(&self) -> &'static str {
        match self {
            Self::DieCutW17H54 => "DieCutW17H54",
            Self::DieCutW29H90 => "DieCutW29H90",
            Self::DieCutW38H90 => "DieCutW38H90",
            Self::DieCutW62H100 => "DieCutW62H100",
            Self::RollW29 => "RollW29",
            Self::RollW62 => "RollW62",
        }
    }
}

/// Print orientation of the label image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn driver_name(&self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// The fixed deployment profile applied to every Wi-Fi label job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelProfile {
    pub orientation: Orientation,
    pub label_size: LabelSize,
    pub auto_cut: bool,
}

impl Default for LabelProfile {
    fn default() -> Self {
        Self {
            orientation: Orientation::Landscape,
            label_size: LabelSize::DieCutW29H90,
            auto_cut: true,
        }
    }
}

/// Complete settings handed to the label printer driver for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPrintSettings {
    pub model: PrinterModel,
    pub orientation: Orientation,
    pub label_size: LabelSize,
    pub auto_cut: bool,
    /// Scratch directory the driver may use while rasterising.
    pub work_path: Option<String>,
}

impl LabelPrintSettings {
    pub fn new(model: PrinterModel, profile: &LabelProfile, work_path: Option<String>) -> Self {
        Self {
            model,
            orientation: profile.orientation,
            label_size: profile.label_size,
            auto_cut: profile.auto_cut,
            work_path,
        }
    }
}

/// A network printer found by vendor discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPrinter {
    pub model: String,
    pub address: String,
}

impl DiscoveredPrinter {
    /// Composite identifier handed to the host: `"<model>~<address>"`.
    pub fn descriptor(&self) -> String {
        format!("{}~{}", self.model, self.address)
    }
}

/// Printer chosen by the host in `check_init`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrinterSelection {
    pub address: String,
    pub model: String,
}

impl PrinterSelection {
    pub fn new(address: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            model: model.into(),
        }
    }

    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Paper geometry reported by the print service for its current printer.
///
/// Width and height are in points (1/72 inch); resolutions are in dpi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperGeometry {
    pub width: u32,
    pub height: u32,
    pub h_dpi: u32,
    pub v_dpi: u32,
}

impl PaperGeometry {
    /// Bitmap size in dots for a label printed rotated onto this paper.
    pub fn rotated_bitmap_size(&self) -> BitmapSize {
        BitmapSize {
            width: self.height.saturating_mul(self.v_dpi) / 72,
            height: self.width.saturating_mul(self.h_dpi) / 72,
        }
    }
}

/// Target bitmap dimensions in dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

impl BitmapSize {
    /// The label layout the print-service deployment renders at: 1062 dots
    /// wide on a 3.5 x 1.1428 in label.
    pub fn check_in_label() -> Self {
        let width = 1062;
        Self {
            width,
            height: (f64::from(width) / 3.5 * 1.1428) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matching_is_exact() {
        assert_eq!(
            PrinterModel::from_selection("Brother QL-820NWB"),
            Some(PrinterModel::Ql820Nwb)
        );
        assert_eq!(PrinterModel::from_selection("QL-820NWB"), None);
        assert_eq!(PrinterModel::from_selection("brother ql-820nwb"), None);
        assert_eq!(PrinterModel::from_selection(""), None);
    }

    #[test]
    fn unknown_model_resolves_to_default() {
        assert_eq!(PrinterModel::resolve("Zebra ZD420"), PrinterModel::Ql1110Nwb);
        assert_eq!(PrinterModel::resolve("Brother QL-800"), PrinterModel::Ql800);
    }

    #[test]
    fn descriptor_joins_model_and_address() {
        let printer = DiscoveredPrinter {
            model: "QL-810W".into(),
            address: "192.168.1.40".into(),
        };
        assert_eq!(printer.descriptor(), "QL-810W~192.168.1.40");
    }

    #[test]
    fn rotated_bitmap_size_swaps_axes() {
        let geometry = PaperGeometry {
            width: 252,
            height: 81,
            h_dpi: 300,
            v_dpi: 600,
        };
        let size = geometry.rotated_bitmap_size();
        assert_eq!(size.width, 81 * 600 / 72);
        assert_eq!(size.height, 252 * 300 / 72);
    }

    #[test]
    fn rotated_bitmap_size_saturates_on_bogus_geometry() {
        let geometry = PaperGeometry {
            width: u32::MAX,
            height: 81,
            h_dpi: 600,
            v_dpi: u32::MAX,
        };
        let size = geometry.rotated_bitmap_size();
        assert_eq!(size.width, u32::MAX / 72);
        assert_eq!(size.height, u32::MAX / 72);
    }

    #[test]
    fn check_in_label_size() {
        assert_eq!(
            BitmapSize::check_in_label(),
            BitmapSize {
                width: 1062,
                height: 346
            }
        );
    }

    #[test]
    fn default_label_profile_is_landscape_die_cut() {
        let profile = LabelProfile::default();
        assert_eq!(profile.orientation, Orientation::Landscape);
        assert_eq!(profile.label_size, LabelSize::DieCutW29H90);
        assert!(profile.auto_cut);
    }
}
