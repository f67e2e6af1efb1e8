// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelbridge: host-facing printer bridge.
//
// `PrinterBridge` is the single entry point the host application talks to.
// It owns the active provider, resolves image URIs, and relays status and
// diagnostic events back out. Vendor SDKs are bound per platform: JNI on
// Android, a stub everywhere else so desktop/CI builds and tests run.

pub mod callback_wire;
pub mod facade;
pub mod journal;
pub mod logging;
pub mod platform;
pub mod resolver;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use facade::PrinterBridge;
pub use journal::EventJournal;
pub use platform::PlatformServices;
pub use resolver::{FileImageResolver, ImageResolver};
