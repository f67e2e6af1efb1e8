// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vendor SDK seams.
//
// The printer protocol, discovery, spooling and driver logic all live inside
// the vendor SDKs. These traits describe exactly the calls the providers
// make, so the platform crate can bind them over JNI and tests can fake them.

use image::DynamicImage;
use labelbridge_core::error::Result;
use labelbridge_core::types::{DiscoveredPrinter, LabelPrintSettings, PaperGeometry};

// ---------------------------------------------------------------------------
// Wi-Fi label printer SDK
// ---------------------------------------------------------------------------

/// Discovery and channel management of the label printer SDK.
pub trait LabelPrinterSdk: Send + Sync {
    /// Find network printers whose model is in `models`.
    fn discover(&self, models: &[String]) -> Result<Vec<DiscoveredPrinter>>;

    /// Open a Wi-Fi channel and return a driver bound to it.
    ///
    /// Failures carry the vendor error code in
    /// `LabelBridgeError::ChannelOpen`.
    fn open_wifi_channel(&self, address: &str) -> Result<Box<dyn LabelPrinterDriver>>;
}

/// A driver bound to one open channel.
pub trait LabelPrinterDriver: Send {
    /// Print one image synchronously. Failures carry the vendor error code in
    /// `LabelBridgeError::PrintImage`.
    fn print_image(&mut self, image: &DynamicImage, settings: &LabelPrintSettings) -> Result<()>;

    fn close_channel(&mut self);
}

// ---------------------------------------------------------------------------
// Print service SDK
// ---------------------------------------------------------------------------

/// The printer currently configured inside the print service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrinter {
    pub name: String,
    pub geometry: PaperGeometry,
}

/// One image option exposed by the print service (size, orientation, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOption {
    pub id: String,
    /// Choices offered by the service, in its order.
    pub values: Vec<String>,
    /// Selected choice.
    pub value: Option<String>,
}

/// Session API of the installed print service.
///
/// Calls return once the request is handed to the service; results arrive
/// later as [`ServiceCallback`]s.
pub trait PrintServiceSdk: Send + Sync {
    /// Start the SDK service connection (answered by `SdkConnected`).
    fn start_sdk(&self) -> Result<()>;

    /// Load recent printers (answered by `RecentPrintersInitialized`).
    fn init_recent_printers(&self) -> Result<()>;

    /// Open the print session and register the service-lifecycle callbacks.
    fn run_service(&self) -> Result<()>;

    /// Register the print-job callbacks.
    fn register_print_callbacks(&self) -> Result<()>;

    fn current_printer(&self) -> Result<Option<ServicePrinter>>;

    fn image_options(&self) -> Result<Vec<ServiceOption>>;

    fn set_image_options(&self, options: &[ServiceOption]) -> Result<()>;

    /// Queue a print of the file at `uri`.
    fn print_uri(&self, title: &str, mime_type: &str, uri: &str) -> Result<()>;

    /// Show the service's printer setup flow.
    fn setup_current_printer(&self) -> Result<()>;

    fn stop_service(&self) -> Result<()>;

    fn clear_service_callbacks(&self) -> Result<()>;

    fn clear_print_callbacks(&self) -> Result<()>;
}

/// Typed vendor callback events, delivered from SDK threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCallback {
    // -- SDK bootstrap --
    SdkConnected,
    SdkDisconnected,
    RecentPrintersInitialized { library_installed: bool },

    // -- Service lifecycle --
    Connected,
    Disconnected,
    FileOpen { progress: u32, finished: bool },
    LibraryDownload { progress: u32 },
    RenderLibraryCheck { render_library: bool, font_library: bool },
    PasswordRequired,
    Error(String),

    // -- Print job --
    StartingJob,
    Started,
    SendingPage { page: u32, progress: u32 },
    PreparingPage { page: u32 },
    NeedCancel,
    FinishingJob,
    Finished { result: String, pages_printed: u32 },
}

/// Value returned to the SDK for callbacks that expect one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackReply {
    Done,
    Flag(bool),
    Password(String),
}
