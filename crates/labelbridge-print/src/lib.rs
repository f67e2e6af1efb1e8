// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelbridge-print: the provider contract and its two vendor
// implementations: a direct Wi-Fi channel to a label printer and an installed
// print service driven by callbacks. Vendor SDKs are reached only through the
// traits in `sdk`; the platform crate supplies the real bindings.

pub mod provider;
pub mod queue;
pub mod schedule;
pub mod sdk;
pub mod service;
pub mod temp_image;
pub mod wifi;

pub use provider::{PrintProvider, SCAN_UNAVAILABLE};
pub use queue::PendingImageQueue;
pub use schedule::{Scheduler, ThreadScheduler};
pub use sdk::{CallbackReply, LabelPrinterDriver, LabelPrinterSdk, PrintServiceSdk, ServiceCallback};
pub use service::{PrintServiceProvider, ServiceState};
pub use temp_image::TempImageStore;
pub use wifi::WifiLabelProvider;
