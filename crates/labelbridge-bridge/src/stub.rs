// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub platform bindings for desktop builds and CI. No vendor SDK is present,
// so discovery finds nothing and every printer call reports the platform as
// unavailable.

use std::sync::Arc;

use tracing::{info, warn};

use labelbridge_core::error::{LabelBridgeError, Result};
use labelbridge_core::events::{BridgeEvent, EventSink};
use labelbridge_core::types::DiscoveredPrinter;
use labelbridge_print::sdk::{ServiceOption, ServicePrinter};
use labelbridge_print::{LabelPrinterDriver, LabelPrinterSdk, PrintServiceSdk, ThreadScheduler};

use crate::platform::PlatformServices;
use crate::resolver::FileImageResolver;

/// Label printer SDK that discovers nothing.
#[derive(Debug, Default)]
pub struct StubLabelPrinterSdk;

impl LabelPrinterSdk for StubLabelPrinterSdk {
    fn discover(&self, _models: &[String]) -> Result<Vec<DiscoveredPrinter>> {
        Ok(Vec::new())
    }

    fn open_wifi_channel(&self, _address: &str) -> Result<Box<dyn LabelPrinterDriver>> {
        Err(LabelBridgeError::PlatformUnavailable)
    }
}

/// Print-service SDK with no service behind it.
#[derive(Debug, Default)]
pub struct StubPrintServiceSdk;

impl PrintServiceSdk for StubPrintServiceSdk {
    fn start_sdk(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn init_recent_printers(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn run_service(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn register_print_callbacks(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn current_printer(&self) -> Result<Option<ServicePrinter>> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn image_options(&self) -> Result<Vec<ServiceOption>> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn set_image_options(&self, _options: &[ServiceOption]) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn print_uri(&self, _title: &str, _mime_type: &str, _uri: &str) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn setup_current_printer(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn stop_service(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn clear_service_callbacks(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }

    fn clear_print_callbacks(&self) -> Result<()> {
        Err(LabelBridgeError::PlatformUnavailable)
    }
}

/// Writes outbound events to the log instead of a host runtime.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &BridgeEvent) {
        match event.payload_json() {
            Ok(payload) => info!(event = event.name(), %payload, "bridge event"),
            Err(e) => warn!(event = event.name(), error = %e, "unserialisable bridge event"),
        }
    }
}

/// Desktop collaborator set.
pub fn services() -> PlatformServices {
    PlatformServices {
        label_printer: Arc::new(StubLabelPrinterSdk),
        print_service: Arc::new(StubPrintServiceSdk),
        resolver: Box::new(FileImageResolver),
        cache_dir: std::env::temp_dir(),
        files_dir: None,
        sinks: vec![Arc::new(LogEventSink)],
        scheduler: Arc::new(ThreadScheduler),
    }
}
