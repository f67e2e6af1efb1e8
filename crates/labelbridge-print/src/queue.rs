// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending-image queue for the print-service provider.

/// Holding area for label image URIs awaiting submission to the print
/// service.
///
/// The discipline is last-in-first-out: when several images are queued
/// before the service asks for the next one, the most recently queued is
/// served first. Deployed check-in labels rely on this order, so it is kept
/// as the explicit contract of this type.
#[derive(Debug, Default, Clone)]
pub struct PendingImageQueue {
    stack: Vec<String>,
}

impl PendingImageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, uri: String) {
        self.stack.push(uri);
    }

    /// Take the most recently pushed URI.
    pub fn pop(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// Drop every queued URI, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.stack.len();
        self.stack.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
