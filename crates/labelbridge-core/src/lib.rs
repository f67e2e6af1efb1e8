// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelbridge: core types, status model and errors shared by every crate.

pub mod config;
pub mod error;
pub mod events;
pub mod relay;
pub mod status;
pub mod types;

pub use config::BridgeConfig;
pub use error::LabelBridgeError;
pub use events::{BridgeEvent, EventSink};
pub use relay::{StatusRelay, SubscriptionId};
pub use status::StatusKind;
pub use types::*;
