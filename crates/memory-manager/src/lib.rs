// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! Slot storage for graph instances.
//!
//! # Key Components
//!
//! - [`MemoryBudget`] — a hard ceiling with human-readable parsing
//!   (`"256M"`, `"1G"`, ...).
//! - [`TensorArena`] — hands out zeroed slot buffers and refuses any
//!   reservation that would exceed the budget.
//! - [`BufferGuard`] — RAII ownership of one slot buffer; dropping it
//!   releases the reservation.
//! - [`AllocationStats`] — counters surfaced by the diagnostic dump.
//!
//! # Ownership Model
//!
//! ```text
//! TensorArena::allocate(size)
//!       │
//!       ▼
//!   BufferGuard  ◄─── owns Vec<u8>, holds Arc<ArenaInner>
//!       │
//!       │  drop()
//!       ▼
//!   ArenaInner::release()  ──► live-byte counter
//! ```

mod arena;
mod budget;
mod error;
mod guard;
mod stats;

pub use arena::TensorArena;
pub use budget::MemoryBudget;
pub use error::MemoryError;
pub use guard::BufferGuard;
pub use stats::AllocationStats;
