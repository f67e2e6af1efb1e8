// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform collaborator set handed to the facade.

use std::path::PathBuf;
use std::sync::Arc;

use labelbridge_core::error::Result;
use labelbridge_core::events::EventSink;
use labelbridge_print::{LabelPrinterSdk, PrintServiceSdk, Scheduler};

use crate::resolver::ImageResolver;

/// Everything the bridge needs from the host platform.
pub struct PlatformServices {
    /// Wi-Fi label printer SDK binding.
    pub label_printer: Arc<dyn LabelPrinterSdk>,
    /// Print-service SDK binding.
    pub print_service: Arc<dyn PrintServiceSdk>,
    /// Resolver for URIs passed to `print_uris`.
    pub resolver: Box<dyn ImageResolver>,
    /// Application cache directory; staged print-service images live below it.
    pub cache_dir: PathBuf,
    /// Application files directory, used as the label driver's work path.
    pub files_dir: Option<String>,
    /// Outbound event destinations (host event emitter, logging).
    pub sinks: Vec<Arc<dyn EventSink>>,
    /// Runner for the print-service queue nudge.
    pub scheduler: Arc<dyn Scheduler>,
}

/// Collaborators for the current target.
///
/// On Android this needs the JVM captured by `nativeInit`; elsewhere it never
/// fails.
pub fn platform_services() -> Result<PlatformServices> {
    #[cfg(target_os = "android")]
    {
        crate::android::services()
    }
    #[cfg(not(target_os = "android"))]
    {
        Ok(crate::stub::services())
    }
}
