// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wi-Fi label printer provider.
//
// Opens a direct channel to the selected printer's address for every batch,
// prints each image synchronously through the vendor driver, then closes the
// channel. The calling thread is blocked for the whole batch.
//
//   Unconfigured --check_init--> configured
//   print_bitmaps: open channel --> print image 1..N --> close channel

use std::sync::{Arc, Mutex, PoisonError};

use image::DynamicImage;
use tracing::{info, instrument, warn};

use labelbridge_core::config::WifiConfig;
use labelbridge_core::error::LabelBridgeError;
use labelbridge_core::relay::StatusRelay;
use labelbridge_core::status::StatusKind;
use labelbridge_core::types::{BatchId, LabelPrintSettings, PrinterModel, PrinterSelection};

use crate::provider::PrintProvider;
use crate::sdk::{LabelPrinterDriver, LabelPrinterSdk};

const SOURCE: &str = "wifi_label";

/// Provider driving a label printer over a direct Wi-Fi channel.
pub struct WifiLabelProvider {
    sdk: Arc<dyn LabelPrinterSdk>,
    relay: Arc<StatusRelay>,
    config: WifiConfig,
    selection: Mutex<PrinterSelection>,
}

impl WifiLabelProvider {
    pub fn new(sdk: Arc<dyn LabelPrinterSdk>, relay: Arc<StatusRelay>, config: WifiConfig) -> Self {
        Self {
            sdk,
            relay,
            config,
            selection: Mutex::new(PrinterSelection::default()),
        }
    }

    /// The printer recorded by the last `check_init`.
    pub fn selection(&self) -> PrinterSelection {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Driver settings for a model selection string.
    ///
    /// Unknown selections use the default model; the label profile is the
    /// configured fixed deployment profile.
    pub fn print_settings(&self, model: &str) -> LabelPrintSettings {
        LabelPrintSettings::new(
            PrinterModel::resolve(model),
            &self.config.label,
            self.config.work_dir.clone(),
        )
    }
}

/// Closes the channel exactly once, including on unwind.
struct OpenChannel(Box<dyn LabelPrinterDriver>);

impl Drop for OpenChannel {
    fn drop(&mut self) {
        self.0.close_channel();
    }
}

/// The vendor error code carried by driver errors, or the full message.
fn error_code(err: &LabelBridgeError) -> String {
    match err {
        LabelBridgeError::ChannelOpen(code) | LabelBridgeError::PrintImage(code) => code.clone(),
        other => other.to_string(),
    }
}

impl PrintProvider for WifiLabelProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn check_init(&self, selection: &PrinterSelection) {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = selection.clone();

        if selection.has_address() {
            self.relay
                .set_status(StatusKind::PrinterAddress(selection.address.clone()));
        } else {
            self.relay.set_status(StatusKind::NoPrinter);
        }
        self.relay.log_event(
            "Model Selected",
            SOURCE,
            &format!("Printer Model - {}", selection.model),
        );
    }

    fn configure(&self) {
        // The label printer needs no setup flow.
    }

    #[instrument(skip_all, fields(images = images.len()))]
    fn print_bitmaps(&self, images: &[DynamicImage]) {
        let batch = BatchId::new();
        let selection = self.selection();

        let mut channel = match self.sdk.open_wifi_channel(&selection.address) {
            Ok(driver) => OpenChannel(driver),
            Err(e) => {
                warn!(%batch, address = %selection.address, error = %e, "channel open failed");
                self.relay.log_error(
                    SOURCE,
                    &format!("Error - Open Channel: {}", error_code(&e)),
                );
                return;
            }
        };
        let settings = self.print_settings(&selection.model);
        info!(%batch, model = settings.model.driver_name(), "printing label batch");

        for (index, image) in images.iter().enumerate() {
            match channel.0.print_image(image, &settings) {
                Ok(()) => self.relay.log_event("Print", SOURCE, "Success - Print Image"),
                Err(e) => {
                    warn!(%batch, index, error = %e, "label print failed; continuing batch");
                    self.relay.log_error(
                        SOURCE,
                        &format!("Error - Print Image: {}", error_code(&e)),
                    );
                }
            }
        }
        // `channel` drops here and closes.
    }

    fn scan(&self) -> Vec<String> {
        let printers = match self.sdk.discover(&self.config.discovery_models) {
            Ok(printers) => printers,
            Err(e) => {
                warn!(error = %e, "label printer discovery failed");
                Vec::new()
            }
        };

        let found: Vec<String> = printers.iter().map(|p| p.descriptor()).collect();
        self.relay
            .log_event("Scan", SOURCE, &format!("Scan - {}", found.len()));
        found
    }
}
