// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Phase timing.
//!
//! [`Profiler::phase`] returns a guard that records a monotonic start time
//! and, when dropped, writes `<phase>: <seconds> sec` to the profiler's sink.
//! Guards report on every exit path, including early `?` returns.
//!
//! Without the `profiling` feature both the profiler handle and the guard
//! are zero-sized: no sink is kept, nothing is timed or recorded, and call
//! sites stay unchanged.

#[cfg(feature = "profiling")]
use std::cell::RefCell;
use std::io::{self, Write};
#[cfg(feature = "profiling")]
use std::rc::Rc;
use std::time::Duration;

/// One finished phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRecord {
    pub phase: &'static str,
    pub elapsed: Duration,
}

impl PhaseRecord {
    /// The diagnostic line for this record, without the newline.
    pub fn line(&self) -> String {
        format!("{}: {:.6} sec", self.phase, self.elapsed.as_secs_f64())
    }
}

#[cfg(feature = "profiling")]
struct ProfilerInner {
    sink: Box<dyn Write>,
    records: Vec<PhaseRecord>,
}

/// Cloneable handle to a shared phase log.
#[derive(Clone)]
pub struct Profiler {
    #[cfg(feature = "profiling")]
    inner: Rc<RefCell<ProfilerInner>>,
}

impl Profiler {
    /// A profiler writing to standard error.
    pub fn new() -> Self {
        Self::with_sink(io::stderr())
    }

    /// A profiler writing to `sink`. The sink is dropped unused when
    /// profiling is compiled out.
    pub fn with_sink(sink: impl Write + 'static) -> Self {
        #[cfg(feature = "profiling")]
        {
            Self {
                inner: Rc::new(RefCell::new(ProfilerInner {
                    sink: Box::new(sink),
                    records: Vec::new(),
                })),
            }
        }
        #[cfg(not(feature = "profiling"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Starts timing `phase`; the returned guard reports when dropped.
    #[must_use = "the phase ends when the guard is dropped"]
    pub fn phase(&self, phase: &'static str) -> PhaseGuard {
        #[cfg(feature = "profiling")]
        {
            PhaseGuard {
                profiler: self.clone(),
                phase,
                start: std::time::Instant::now(),
            }
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = phase;
            PhaseGuard {}
        }
    }

    /// Phases reported so far, in completion order.
    pub fn records(&self) -> Vec<PhaseRecord> {
        #[cfg(feature = "profiling")]
        {
            self.inner.borrow().records.clone()
        }
        #[cfg(not(feature = "profiling"))]
        {
            Vec::new()
        }
    }

    /// `true` if `phase` has been reported.
    pub fn reported(&self, phase: &str) -> bool {
        self.records().iter().any(|r| r.phase == phase)
    }

    #[cfg(feature = "profiling")]
    fn finish(&self, record: PhaseRecord) {
        let mut inner = self.inner.borrow_mut();
        // A broken diagnostic stream must not turn into a run failure.
        let _ = writeln!(inner.sink, "{}", record.line());
        inner.records.push(record);
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("records", &self.records())
            .finish()
    }
}

/// Scope guard for one phase.
#[derive(Debug)]
pub struct PhaseGuard {
    #[cfg(feature = "profiling")]
    profiler: Profiler,
    #[cfg(feature = "profiling")]
    phase: &'static str,
    #[cfg(feature = "profiling")]
    start: std::time::Instant,
}

#[cfg(feature = "profiling")]
impl Drop for PhaseGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::debug!(phase = self.phase, elapsed_us = elapsed.as_micros() as u64, "phase finished");
        self.profiler.finish(PhaseRecord {
            phase: self.phase,
            elapsed,
        });
    }
}
