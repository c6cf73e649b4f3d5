// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation counters reported by the diagnostic dump.

/// Cumulative statistics about arena usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Successful reservations.
    pub allocations: u64,
    /// Guards dropped.
    pub releases: u64,
    /// Reservations refused by the budget.
    pub oom_count: u64,
    /// High-water mark of live bytes.
    pub peak_allocated_bytes: usize,
    /// Total bytes ever reserved.
    pub cumulative_allocated_bytes: u64,
}

impl AllocationStats {
    pub(crate) fn record_allocation(&mut self, size: usize, live_total: usize) {
        self.allocations += 1;
        self.cumulative_allocated_bytes += size as u64;
        self.peak_allocated_bytes = self.peak_allocated_bytes.max(live_total);
    }

    pub(crate) fn record_oom(&mut self) {
        self.oom_count += 1;
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        let peak_kb = self.peak_allocated_bytes as f64 / 1024.0;
        format!(
            "{} allocations, {} releases, {} refused, peak {:.1} KB",
            self.allocations, self.releases, self.oom_count, peak_kb,
        )
    }
}
