// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Borrowed views over one tensor slot of a graph instance.

use crate::RuntimeError;
use tensor_core::{DType, Element, QuantParams, Shape, TensorInfo, TypedView, TypedViewMut};

/// Read-only descriptor and data of a tensor slot.
#[derive(Debug, Clone, Copy)]
pub struct TensorSlotView<'a> {
    index: usize,
    info: &'a TensorInfo,
    data: Option<&'a [u8]>,
}

impl<'a> TensorSlotView<'a> {
    /// `data` is `None` while the graph is unallocated.
    pub fn new(index: usize, info: &'a TensorInfo, data: Option<&'a [u8]>) -> Self {
        Self { index, info, data }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> &'a TensorInfo {
        self.info
    }

    pub fn name(&self) -> &'a str {
        &self.info.name
    }

    pub fn dtype(&self) -> DType {
        self.info.dtype
    }

    pub fn shape(&self) -> &'a Shape {
        &self.info.shape
    }

    /// Declared byte size; 0 for element types without a fixed width.
    pub fn byte_size(&self) -> usize {
        self.info.byte_size().unwrap_or(0)
    }

    /// Quantization parameters, or the all-zero default for plain slots.
    pub fn quantization(&self) -> QuantParams {
        self.info.quantization.unwrap_or_default()
    }

    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    pub fn bytes(&self) -> Option<&'a [u8]> {
        self.data
    }

    pub fn typed<T: Element>(&self) -> Result<TypedView<'a, T>, RuntimeError> {
        let data = self.data.ok_or(RuntimeError::NotAllocated)?;
        Ok(TypedView::new(self.info.dtype, data)?)
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, RuntimeError> {
        Ok(self.typed::<T>()?.to_vec())
    }
}

/// Writable access to an allocated graph-input slot.
///
/// Writes go through [`TensorSlotMut::typed_mut`], which refuses a primitive
/// that does not match the declared element type and bounds-checks every
/// element against the declared extent.
#[derive(Debug)]
pub struct TensorSlotMut<'a> {
    index: usize,
    info: &'a TensorInfo,
    data: &'a mut [u8],
}

impl<'a> TensorSlotMut<'a> {
    pub fn new(index: usize, info: &'a TensorInfo, data: &'a mut [u8]) -> Self {
        Self { index, info, data }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> &'a TensorInfo {
        self.info
    }

    pub fn dtype(&self) -> DType {
        self.info.dtype
    }

    pub fn shape(&self) -> &'a Shape {
        &self.info.shape
    }

    /// Converts into a typed writer over the whole slot.
    pub fn typed_mut<T: Element>(self) -> Result<TypedViewMut<'a, T>, RuntimeError> {
        Ok(TypedViewMut::new(self.info.dtype, self.data)?)
    }
}
