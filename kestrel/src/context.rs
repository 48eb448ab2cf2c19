/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Loop iterations between two polls of the cancellation flag.
pub const CANCELLATION_CHECK_INTERVAL: u32 = 1024;

/// Per-evaluation settings threaded through scans and joins.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancel: Option<Arc<AtomicBool>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluation stops with [`EngineError::Cancelled`] once `flag` is raised.
    pub fn with_cancellation(flag: Arc<AtomicBool>) -> Self {
        Self { cancel: Some(flag) }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn probe(&self) -> CancellationProbe<'_> {
        CancellationProbe { context: self, steps: 0 }
    }
}

/// Cheap per-loop counter that only reads the flag every few iterations.
pub struct CancellationProbe<'c> {
    context: &'c ExecutionContext,
    steps: u32,
}

impl CancellationProbe<'_> {
    #[inline]
    pub fn tick(&mut self) -> Result<()> {
        self.steps = self.steps.wrapping_add(1);
        if self.steps % CANCELLATION_CHECK_INTERVAL == 0 {
            self.context.check()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_never_cancels() {
        let ctx = ExecutionContext::new();
        let mut probe = ctx.probe();
        for _ in 0..(CANCELLATION_CHECK_INTERVAL * 3) {
            assert!(probe.tick().is_ok());
        }
    }

    #[test]
    fn test_probe_sees_raised_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = ExecutionContext::with_cancellation(flag.clone());
        assert!(ctx.check().is_ok());
        flag.store(true, Ordering::Relaxed);
        let mut probe = ctx.probe();
        let mut outcome = Ok(());
        for _ in 0..CANCELLATION_CHECK_INTERVAL {
            outcome = probe.tick();
            if outcome.is_err() {
                break;
            }
        }
        assert!(matches!(outcome, Err(EngineError::Cancelled)));
    }
}
