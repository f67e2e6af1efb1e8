// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot delayed tasks.

use std::time::Duration;

use tracing::warn;

/// Runs a task once after a delay. Best effort: there is no cancellation and
/// no guarantee about which thread runs it.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Spawns a short-lived thread per task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send + 'static>) {
        let spawned = std::thread::Builder::new()
            .name("labelbridge-delay".into())
            .spawn(move || {
                std::thread::sleep(delay);
                task();
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn delayed task thread; task dropped");
        }
    }
}
