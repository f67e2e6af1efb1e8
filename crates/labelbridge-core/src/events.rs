// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbound events delivered to the host application.

use serde::Serialize;

/// An asynchronous event for the host runtime.
///
/// Serialises to the payload object only; the event name travels separately
/// via [`BridgeEvent::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeEvent {
    /// The printer status changed.
    StatusUpdated { status: String },
    /// Diagnostic lifecycle event (scan results, model selection, prints).
    Event {
        #[serde(rename = "eventType")]
        event_type: String,
        source: String,
        message: String,
    },
    /// A provider-side failure.
    Error { source: String, message: String },
}

impl BridgeEvent {
    /// Event name registered with the host's event emitter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusUpdated { .. } => "StatusUpdated",
            Self::Event { .. } => "onEvent",
            Self::Error { .. } => "onError",
        }
    }

    /// JSON payload for the host.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Destination for outbound events (host event emitter, journal, ...).
///
/// Implementations must not block for long: events are emitted on whichever
/// thread changed the status, including vendor callback threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BridgeEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_match_host_shape() {
        let status = BridgeEvent::StatusUpdated {
            status: "No Printer".into(),
        };
        assert_eq!(status.name(), "StatusUpdated");
        assert_eq!(status.payload_json().unwrap(), r#"{"status":"No Printer"}"#);

        let event = BridgeEvent::Event {
            event_type: "Scan".into(),
            source: "wifi_label".into(),
            message: "Scan - 2".into(),
        };
        assert_eq!(event.name(), "onEvent");
        assert_eq!(
            event.payload_json().unwrap(),
            r#"{"eventType":"Scan","source":"wifi_label","message":"Scan - 2"}"#
        );

        let error = BridgeEvent::Error {
            source: "wifi_label".into(),
            message: "Error - Open Channel: Timeout".into(),
        };
        assert_eq!(error.name(), "onError");
        assert_eq!(
            error.payload_json().unwrap(),
            r#"{"source":"wifi_label","message":"Error - Open Channel: Timeout"}"#
        );
    }
}
