// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor arena with optional budget enforcement.
//!
//! The [`TensorArena`] hands out one zeroed buffer per tensor slot and keeps
//! a running total of live bytes. With a budget set, a reservation that
//! would push the total past the ceiling fails with
//! [`MemoryError::OutOfMemory`] and nothing is allocated.
//!
//! Buffers are never recycled: a graph instance allocates each slot once and
//! holds it until the instance is dropped.

use crate::{AllocationStats, BufferGuard, MemoryBudget, MemoryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// State shared between the arena and its outstanding guards.
pub(crate) struct ArenaInner {
    budget: Option<MemoryBudget>,
    allocated_bytes: AtomicUsize,
    stats: Mutex<AllocationStats>,
}

impl ArenaInner {
    /// Called by `BufferGuard::drop`.
    pub(crate) fn release(&self, size_bytes: usize) {
        self.allocated_bytes.fetch_sub(size_bytes, Ordering::AcqRel);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_release();
        }
    }
}

/// Allocator for tensor slot storage.
///
/// # Example
/// ```
/// use memory_manager::{MemoryBudget, TensorArena};
///
/// let arena = TensorArena::with_budget(MemoryBudget::from_bytes(64));
/// let ids = arena.allocate(32).unwrap();
/// assert_eq!(arena.allocated_bytes(), 32);
/// assert!(arena.allocate(40).is_err());
///
/// drop(ids);
/// assert_eq!(arena.allocated_bytes(), 0);
/// ```
#[derive(Clone)]
pub struct TensorArena {
    inner: Arc<ArenaInner>,
}

impl TensorArena {
    /// An arena without a ceiling.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn with_budget(budget: MemoryBudget) -> Self {
        Self::new(Some(budget))
    }

    pub fn new(budget: Option<MemoryBudget>) -> Self {
        Self {
            inner: Arc::new(ArenaInner {
                budget,
                allocated_bytes: AtomicUsize::new(0),
                stats: Mutex::new(AllocationStats::default()),
            }),
        }
    }

    /// Reserves a zeroed buffer of exactly `size_bytes`.
    ///
    /// Zero-byte reservations succeed; they back slots with an empty shape.
    /// A request the system allocator refuses is reported as
    /// [`MemoryError::AllocationFailed`] and leaves the accounting untouched.
    pub fn allocate(&self, size_bytes: usize) -> Result<BufferGuard, MemoryError> {
        let current = self.inner.allocated_bytes.load(Ordering::Acquire);
        if let Some(budget) = self.inner.budget {
            let limit = budget.as_bytes();
            if current.saturating_add(size_bytes) > limit {
                if let Ok(mut stats) = self.inner.stats.lock() {
                    stats.record_oom();
                }
                tracing::warn!(
                    requested = size_bytes,
                    allocated = current,
                    budget = %budget,
                    "arena budget exceeded"
                );
                return Err(MemoryError::OutOfMemory {
                    requested_bytes: size_bytes,
                    available_bytes: limit.saturating_sub(current),
                    budget_bytes: limit,
                });
            }
        }

        let mut data: Vec<u8> = Vec::new();
        if let Err(e) = data.try_reserve_exact(size_bytes) {
            tracing::warn!(requested = size_bytes, "slot allocation refused: {e}");
            return Err(MemoryError::AllocationFailed {
                requested_bytes: size_bytes,
            });
        }
        data.resize(size_bytes, 0);
        let total = self
            .inner
            .allocated_bytes
            .fetch_add(size_bytes, Ordering::AcqRel)
            + size_bytes;
        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_allocation(size_bytes, total);
        }
        Ok(BufferGuard::new(data, Arc::clone(&self.inner)))
    }

    /// Bytes held by live guards.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Bytes left before the ceiling, or `None` for an unbounded arena.
    pub fn available_bytes(&self) -> Option<usize> {
        self.inner
            .budget
            .map(|b| b.as_bytes().saturating_sub(self.allocated_bytes()))
    }

    pub fn budget(&self) -> Option<MemoryBudget> {
        self.inner.budget
    }

    /// Snapshot of the allocation counters.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Default for TensorArena {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for TensorArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorArena")
            .field("budget", &self.inner.budget)
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_drop() {
        let arena = TensorArena::unbounded();
        let guard = arena.allocate(1024).unwrap();
        assert_eq!(arena.allocated_bytes(), 1024);
        assert_eq!(guard.size_bytes(), 1024);
        assert!(guard.as_slice().iter().all(|&b| b == 0));

        drop(guard);
        assert_eq!(arena.allocated_bytes(), 0);
        assert_eq!(arena.available_bytes(), None);
    }

    #[test]
    fn test_budget_exhaustion() {
        let arena = TensorArena::with_budget(MemoryBudget::from_bytes(1024));
        let _a = arena.allocate(512).unwrap();
        let _b = arena.allocate(512).unwrap();
        assert_eq!(arena.available_bytes(), Some(0));

        let result = arena.allocate(1);
        assert!(matches!(
            result,
            Err(MemoryError::OutOfMemory {
                requested_bytes: 1,
                available_bytes: 0,
                budget_bytes: 1024
            })
        ));
        assert_eq!(arena.allocated_bytes(), 1024);
    }

    #[test]
    fn test_zero_byte_slot() {
        let arena = TensorArena::with_budget(MemoryBudget::from_bytes(8));
        let g = arena.allocate(0).unwrap();
        assert!(g.as_slice().is_empty());
    }

    #[test]
    fn test_unsatisfiable_request_is_an_error() {
        let arena = TensorArena::unbounded();
        let result = arena.allocate(usize::MAX);
        assert!(matches!(
            result,
            Err(MemoryError::AllocationFailed {
                requested_bytes: usize::MAX
            })
        ));
        assert_eq!(arena.allocated_bytes(), 0);
        assert_eq!(arena.stats().allocations, 0);
        assert!(arena.allocate(8).is_ok());
    }

    #[test]
    fn test_writes_stay_in_guard() {
        let arena = TensorArena::unbounded();
        let mut g = arena.allocate(16).unwrap();
        g.as_mut_slice()[3] = 42;
        assert_eq!(g.as_slice()[3], 42);
        assert_eq!(g.size_bytes(), 16);
    }

    #[test]
    fn test_clone_shares_accounting() {
        let arena = TensorArena::with_budget(MemoryBudget::from_bytes(100));
        let other = arena.clone();
        let _g = other.allocate(60).unwrap();
        assert_eq!(arena.allocated_bytes(), 60);
        assert!(arena.allocate(60).is_err());
    }

    #[test]
    fn test_stats() {
        let arena = TensorArena::with_budget(MemoryBudget::from_bytes(3000));
        let g1 = arena.allocate(1000).unwrap();
        let g2 = arena.allocate(2000).unwrap();
        let _ = arena.allocate(1);
        drop(g1);
        drop(g2);

        let stats = arena.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.releases, 2);
        assert_eq!(stats.oom_count, 1);
        assert_eq!(stats.peak_allocated_bytes, 3000);
        assert_eq!(stats.cumulative_allocated_bytes, 3000);
    }
}
