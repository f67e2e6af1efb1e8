// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The capability contract every printer provider implements.

use image::DynamicImage;
use labelbridge_core::types::PrinterSelection;

use crate::sdk::{CallbackReply, ServiceCallback};

/// Sole scan entry returned by providers without network discovery.
pub const SCAN_UNAVAILABLE: &str = "Scan unavailable";

/// A pluggable printing backend bound to one vendor SDK.
///
/// None of these operations return errors: failures are turned into status
/// updates, relay error events or log records inside the provider, so the
/// host never sees a fault.
pub trait PrintProvider: Send + Sync {
    /// Short identifier used as the `source` of relay events.
    fn name(&self) -> &'static str;

    /// Record the target printer and publish the resulting status.
    fn check_init(&self, selection: &PrinterSelection);

    /// Run any vendor-side printer setup. Safe to call repeatedly.
    fn configure(&self);

    /// Submit an ordered batch of images. Per-image failures are logged and
    /// the rest of the batch is still attempted.
    fn print_bitmaps(&self, images: &[DynamicImage]);

    /// Discovered printers as `"<model>~<address>"`, or a single
    /// [`SCAN_UNAVAILABLE`] entry when the provider cannot discover.
    fn scan(&self) -> Vec<String>;

    /// Feed an asynchronous vendor callback into the provider.
    ///
    /// Providers without a callback-driven SDK ignore it.
    fn handle_callback(&self, callback: ServiceCallback) -> CallbackReply {
        tracing::debug!(provider = self.name(), ?callback, "callback ignored");
        CallbackReply::Done
    }

    /// Release vendor sessions. Safe to call when nothing is attached.
    fn detach(&self) {}
}
