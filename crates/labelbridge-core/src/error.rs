// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for labelbridge.

use thiserror::Error;

/// Top-level error type for all labelbridge operations.
///
/// None of these cross the host boundary: providers turn them into status
/// values or relay events before returning.
#[derive(Debug, Error)]
pub enum LabelBridgeError {
    // -- Wi-Fi label printer --
    #[error("printer discovery failed: {0}")]
    Discovery(String),

    #[error("failed to open printer channel: {0}")]
    ChannelOpen(String),

    #[error("failed to print image: {0}")]
    PrintImage(String),

    // -- Print service --
    #[error("print service error: {0}")]
    PrintService(String),

    #[error("print service is not installed")]
    ServiceNotInstalled,

    #[error("no printer configured in the print service")]
    NoPrinterConfigured,

    // -- Images --
    #[error("failed to resolve image {uri}: {reason}")]
    ImageResolve { uri: String, reason: String },

    #[error("failed to encode image: {0}")]
    ImageEncode(String),

    // -- Storage / persistence --
    #[error("journal error: {0}")]
    Journal(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelBridgeError>;
