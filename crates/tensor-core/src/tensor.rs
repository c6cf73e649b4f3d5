// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor descriptors, owned tensors, and typed views over raw buffers.
//!
//! Buffers are plain byte slices. Typed access goes through
//! [`TypedView`] / [`TypedViewMut`], which refuse to reinterpret a buffer
//! whose declared [`DType`] differs from the requested primitive and
//! bounds-check every element access. Elements are read and written with
//! unaligned loads/stores, so the backing allocation needs no particular
//! alignment.

use crate::{DType, Element, QuantParams, Shape, TensorError};
use std::marker::PhantomData;

/// Static description of a tensor slot: everything except its data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorInfo {
    /// Slot name; may be empty for anonymous intermediates.
    pub name: String,
    pub dtype: DType,
    pub shape: Shape,
    /// Affine quantization parameters, for quantized slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<QuantParams>,
}

impl TensorInfo {
    pub fn new(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
            quantization: None,
        }
    }

    /// Attaches quantization parameters.
    pub fn with_quantization(mut self, params: QuantParams) -> Self {
        self.quantization = Some(params);
        self
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Bytes needed to back this slot, or `None` if the element type has no
    /// fixed layout.
    pub fn byte_size(&self) -> Option<usize> {
        self.shape
            .checked_num_elements()
            .and_then(|n| self.dtype.byte_size_for(n))
    }
}

// ── Typed views ────────────────────────────────────────────────

fn element_count<T: Element>(dtype: DType, len_bytes: usize) -> Result<usize, TensorError> {
    if dtype != T::DTYPE {
        return Err(TensorError::TypeMismatch {
            declared: dtype,
            requested: T::DTYPE,
        });
    }
    let size = std::mem::size_of::<T>();
    if len_bytes % size != 0 {
        return Err(TensorError::BufferSizeMismatch {
            expected: (len_bytes / size + 1) * size,
            actual: len_bytes,
        });
    }
    Ok(len_bytes / size)
}

/// A read-only typed window over a tensor buffer.
#[derive(Debug, Clone, Copy)]
pub struct TypedView<'a, T: Element> {
    bytes: &'a [u8],
    len: usize,
    _elem: PhantomData<T>,
}

impl<'a, T: Element> TypedView<'a, T> {
    /// Creates a view, checking that `T` matches the declared `dtype`.
    pub fn new(dtype: DType, bytes: &'a [u8]) -> Result<Self, TensorError> {
        let len = element_count::<T>(dtype, bytes.len())?;
        Ok(Self {
            bytes,
            len,
            _elem: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads element `index`.
    pub fn get(&self, index: usize) -> Result<T, TensorError> {
        if index >= self.len {
            return Err(TensorError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let size = std::mem::size_of::<T>();
        Ok(bytemuck::pod_read_unaligned(
            &self.bytes[index * size..(index + 1) * size],
        ))
    }

    /// Iterates over all elements in order.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        self.bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned::<T>)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// A writable typed window over a tensor buffer.
///
/// Writes can only land inside the buffer the view was created from.
#[derive(Debug)]
pub struct TypedViewMut<'a, T: Element> {
    bytes: &'a mut [u8],
    len: usize,
    _elem: PhantomData<T>,
}

impl<'a, T: Element> TypedViewMut<'a, T> {
    /// Creates a view, checking that `T` matches the declared `dtype`.
    pub fn new(dtype: DType, bytes: &'a mut [u8]) -> Result<Self, TensorError> {
        let len = element_count::<T>(dtype, bytes.len())?;
        Ok(Self {
            bytes,
            len,
            _elem: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Result<T, TensorError> {
        self.as_view().get(index)
    }

    /// Writes `value` at element `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), TensorError> {
        if index >= self.len {
            return Err(TensorError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let size = std::mem::size_of::<T>();
        self.bytes[index * size..(index + 1) * size].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Overwrites the whole buffer; `values` must have exactly `len()` elements.
    pub fn copy_from_slice(&mut self, values: &[T]) -> Result<(), TensorError> {
        if values.len() != self.len {
            let size = std::mem::size_of::<T>();
            return Err(TensorError::BufferSizeMismatch {
                expected: self.len * size,
                actual: values.len() * size,
            });
        }
        self.bytes.copy_from_slice(bytemuck::cast_slice(values));
        Ok(())
    }

    /// Writes `f(i)` into every element `i`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> T) {
        let size = std::mem::size_of::<T>();
        for (i, chunk) in self.bytes.chunks_exact_mut(size).enumerate() {
            chunk.copy_from_slice(bytemuck::bytes_of(&f(i)));
        }
    }

    pub fn as_view(&self) -> TypedView<'_, T> {
        TypedView {
            bytes: &*self.bytes,
            len: self.len,
            _elem: PhantomData,
        }
    }
}

// ── Borrowed tensor ────────────────────────────────────────────

/// A borrowed, read-only view over tensor storage that lives elsewhere
/// (an owned [`Tensor`] or a slot buffer in a graph instance).
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    dtype: DType,
    data: &'a [u8],
}

impl<'a> TensorView<'a> {
    /// Creates a view from raw parts.
    pub fn from_parts(shape: &'a Shape, dtype: DType, data: &'a [u8]) -> Self {
        Self { shape, dtype, data }
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn typed<T: Element>(&self) -> Result<TypedView<'a, T>, TensorError> {
        TypedView::new(self.dtype, self.data)
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, TensorError> {
        Ok(self.typed::<T>()?.to_vec())
    }
}

// ── Owned tensor ───────────────────────────────────────────────

/// An owned tensor stored as a flat row-major byte buffer.
///
/// Used for constant data (weights) carried by a model, and for kernel
/// outputs before they are copied into a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
}

/// Bytes backing `shape` elements of `dtype`, rejecting unsized types and
/// layouts larger than any allocation can be.
fn storage_size(op: &'static str, shape: &Shape, dtype: DType) -> Result<usize, TensorError> {
    if dtype.byte_size_for(1).is_none() {
        return Err(TensorError::UnsupportedDType { op, dtype });
    }
    shape
        .checked_num_elements()
        .and_then(|n| dtype.byte_size_for(n))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or_else(|| TensorError::TooLarge {
            shape: shape.clone(),
            dtype,
        })
}

impl Tensor {
    /// Creates a zero-filled tensor.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, Shape, Tensor};
    /// let t = Tensor::zeros(Shape::matrix(1, 8), DType::Int64).unwrap();
    /// assert_eq!(t.size_bytes(), 64);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Result<Self, TensorError> {
        let size = storage_size("zeros", &shape, dtype)?;
        Ok(Self {
            shape,
            dtype,
            data: vec![0u8; size],
        })
    }

    /// Creates a tensor from raw bytes.
    ///
    /// Returns an error if the buffer size does not match the layout implied
    /// by `shape` and `dtype`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = storage_size("from_bytes", &shape, dtype)?;
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, dtype, data })
    }

    /// Creates a tensor from typed values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Shape, Tensor};
    /// let t = Tensor::from_values(Shape::vector(3), &[1.0f32, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_values<T: Element>(shape: Shape, values: &[T]) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if values.len() != expected {
            let size = std::mem::size_of::<T>();
            return Err(TensorError::BufferSizeMismatch {
                expected: expected * size,
                actual: values.len() * size,
            });
        }
        Ok(Self {
            shape,
            dtype: T::DTYPE,
            data: bytemuck::cast_slice(values).to_vec(),
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView::from_parts(&self.shape, self.dtype, &self.data)
    }

    pub fn typed<T: Element>(&self) -> Result<TypedView<'_, T>, TensorError> {
        TypedView::new(self.dtype, &self.data)
    }

    pub fn typed_mut<T: Element>(&mut self) -> Result<TypedViewMut<'_, T>, TensorError> {
        TypedViewMut::new(self.dtype, &mut self.data)
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, TensorError> {
        Ok(self.typed::<T>()?.to_vec())
    }
}
