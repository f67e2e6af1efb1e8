// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer status as seen by the host application.
//
// Providers publish a `StatusKind`; the text the host matches on is produced
// only by `Display`, at the boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every status a provider can publish.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusKind {
    /// Nothing has been initialised yet.
    #[default]
    PendingInit,
    /// The print-service SDK is starting.
    InitializingService,
    /// The print-service SDK is up and its libraries are installed.
    ServiceInitialized,
    /// The print service is missing; check-in continues without printing.
    ServiceNotInstalled,
    /// Printer setup was requested but the service could not be reached.
    InstallServiceRequired,
    /// Attaching to the print service.
    DetectingPrinter,
    ServiceConnected,
    ServiceDisconnected,
    /// The print service has no current printer.
    PrinterNotConfigured,
    /// Paper negotiated, ready to print.
    PrinterReady { name: String },
    /// Wi-Fi label printer selected at this address.
    PrinterAddress(String),
    /// No Wi-Fi label printer address was supplied.
    NoPrinter,
    /// Error reported by the print service.
    ServiceError(String),
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingInit => f.write_str("Pending init"),
            Self::InitializingService => f.write_str("Initializing print service."),
            Self::ServiceInitialized => f.write_str("Initialized"),
            Self::ServiceNotInstalled => f.write_str(
                "Print service required to enable printing.  You may still check in.",
            ),
            Self::InstallServiceRequired => {
                f.write_str("Please install the print service application.")
            }
            Self::DetectingPrinter => f.write_str("Detecting printer."),
            Self::ServiceConnected => f.write_str("Service connected."),
            Self::ServiceDisconnected => f.write_str("Service disconnected."),
            Self::PrinterNotConfigured => f.write_str("Printer not configured."),
            Self::PrinterReady { name } => write!(f, "Printer ready: {name}"),
            Self::PrinterAddress(address) => f.write_str(address),
            Self::NoPrinter => f.write_str("No Printer"),
            Self::ServiceError(message) => write!(f, "error, {message}"),
        }
    }
}
