// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII buffer guard that releases its reservation on drop.
//!
//! Every tensor slot owns exactly one [`BufferGuard`]. Dropping the guard,
//! on success or on any early-return error path, hands its bytes back to the
//! arena's accounting.

use crate::arena::ArenaInner;
use std::sync::Arc;

/// An RAII guard wrapping one slot's zero-initialised byte buffer.
pub struct BufferGuard {
    data: Vec<u8>,
    arena: Arc<ArenaInner>,
}

impl BufferGuard {
    pub(crate) fn new(data: Vec<u8>, arena: Arc<ArenaInner>) -> Self {
        Self { data, arena }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Size of this reservation in bytes. Fixed for the guard's lifetime.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

impl Drop for BufferGuard {
    fn drop(&mut self) {
        self.arena.release(self.data.len());
    }
}

impl std::fmt::Debug for BufferGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferGuard")
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
