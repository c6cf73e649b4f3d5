// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor contract validation.
//!
//! A population strategy never writes through a slot it has not checked.
//! [`validate_text`] and [`validate_synthetic`] inspect the graph's declared
//! input signature and, on success, return a binding value. Bindings cannot
//! be constructed any other way, and they are the only path to the typed
//! write helpers, so a rejected graph is never written to.

use crate::{HarnessError, TokenSequenceTriple, TokenizerError};
use runtime::{GraphInstance, RuntimeError, TensorSlotMut};
use tensor_core::{DType, Element, Shape, TensorError};

/// A declared input signature the active strategy cannot bind to.
#[derive(Debug, thiserror::Error)]
pub enum ContractViolation {
    #[error("model declares no input tensors")]
    NoInputs,

    #[error("expected {expected} input tensors, model declares {actual}")]
    InputCount { expected: usize, actual: usize },

    #[error("input slot {slot} ('{name}') is {actual}, expected {expected}")]
    ElementType {
        slot: usize,
        name: String,
        expected: &'static str,
        actual: DType,
    },

    #[error("input slot {slot} ('{name}') has shape {shape}, expected {expected}")]
    Shape {
        slot: usize,
        name: String,
        shape: Shape,
        expected: &'static str,
    },

    #[error("input slot {slot} ('{name}') has sequence length {actual}, slot 0 has {expected}")]
    SequenceLength {
        slot: usize,
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("input slot {slot} ('{name}') has no elements")]
    Empty { slot: usize, name: String },

    #[error("input slot {slot} ('{name}') is {dtype} and cannot hold the values 1..={count}")]
    Overflow {
        slot: usize,
        name: String,
        dtype: DType,
        count: usize,
    },

    #[error("cannot access input slot {slot}")]
    Slot {
        slot: usize,
        #[source]
        source: RuntimeError,
    },
}

/// Proof that a graph has the three int64 `[1, L]` inputs of a text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBinding {
    slots: [usize; 3],
    seq_len: usize,
}

/// Proof that a graph's first input is a non-empty integer slot that can
/// hold the counting sequence `1..=count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticBinding {
    slot: usize,
    name: String,
    dtype: DType,
    count: usize,
}

/// Checks the text signature: exactly three inputs (token ids, segment ids,
/// attention mask), each int64 of shape `[1, L]` with the same `L > 0`.
pub fn validate_text<G>(graph: &G) -> Result<TextBinding, ContractViolation>
where
    G: GraphInstance + ?Sized,
{
    let inputs = graph.inputs();
    let &[ids, segments, mask] = inputs else {
        return Err(ContractViolation::InputCount {
            expected: 3,
            actual: inputs.len(),
        });
    };

    let mut seq_len = None;
    for slot in [ids, segments, mask] {
        let view = graph
            .tensor(slot)
            .map_err(|source| ContractViolation::Slot { slot, source })?;
        if view.dtype() != DType::Int64 {
            return Err(ContractViolation::ElementType {
                slot,
                name: view.name().to_string(),
                expected: "int64",
                actual: view.dtype(),
            });
        }
        let &[1, len] = view.shape().dims() else {
            return Err(ContractViolation::Shape {
                slot,
                name: view.name().to_string(),
                shape: view.shape().clone(),
                expected: "[1, L]",
            });
        };
        if len == 0 {
            return Err(ContractViolation::Empty {
                slot,
                name: view.name().to_string(),
            });
        }
        match seq_len {
            None => seq_len = Some(len),
            Some(expected) if expected != len => {
                return Err(ContractViolation::SequenceLength {
                    slot,
                    name: view.name().to_string(),
                    expected,
                    actual: len,
                });
            }
            Some(_) => {}
        }
    }

    let seq_len = seq_len.unwrap_or_default();
    tracing::debug!(ids, segments, mask, seq_len, "text input contract satisfied");
    Ok(TextBinding {
        slots: [ids, segments, mask],
        seq_len,
    })
}

/// Checks the synthetic signature: at least one input, the first one an
/// integer type with at least one element, every value of `1..=N`
/// representable.
pub fn validate_synthetic<G>(graph: &G) -> Result<SyntheticBinding, ContractViolation>
where
    G: GraphInstance + ?Sized,
{
    let &slot = graph.inputs().first().ok_or(ContractViolation::NoInputs)?;
    let view = graph
        .tensor(slot)
        .map_err(|source| ContractViolation::Slot { slot, source })?;
    let name = view.name().to_string();
    let dtype = view.dtype();

    let Some(max) = dtype.integer_max() else {
        return Err(ContractViolation::ElementType {
            slot,
            name,
            expected: "an integer type",
            actual: dtype,
        });
    };
    let count = view.shape().num_elements();
    if count == 0 {
        return Err(ContractViolation::Empty { slot, name });
    }
    if u64::try_from(count).map_or(true, |n| n > max) {
        return Err(ContractViolation::Overflow {
            slot,
            name,
            dtype,
            count,
        });
    }

    tracing::debug!(slot, %dtype, count, "synthetic input contract satisfied");
    Ok(SyntheticBinding {
        slot,
        name,
        dtype,
        count,
    })
}

impl TextBinding {
    /// Slot indices of token ids, segment ids and attention mask.
    pub fn slots(&self) -> [usize; 3] {
        self.slots
    }

    /// The sequence length `L` shared by all three slots.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Writes the triple into the bound slots, element `i` of each sequence
    /// at offset `i`.
    ///
    /// Nothing is written unless all three slots accept the triple: its
    /// lengths are checked again first, then every slot is opened as an
    /// `i64` view of length `L`, and only then are the values copied.
    pub fn write<G>(&self, graph: &mut G, triple: &TokenSequenceTriple) -> Result<(), HarnessError>
    where
        G: GraphInstance + ?Sized,
    {
        let lengths = [triple.ids.len(), triple.segment_ids.len(), triple.mask.len()];
        if lengths.iter().any(|&n| n != self.seq_len) {
            return Err(HarnessError::TokenizerProcess(TokenizerError::Length {
                expected: self.seq_len,
                ids: lengths[0],
                segments: lengths[1],
                mask: lengths[2],
            }));
        }

        let sequences = [&triple.ids, &triple.segment_ids, &triple.mask];
        for slot in self.slots {
            write_slot(graph, slot, |view| {
                let view = view.typed_mut::<i64>()?;
                if view.len() != self.seq_len {
                    let size = std::mem::size_of::<i64>();
                    return Err(TensorError::BufferSizeMismatch {
                        expected: self.seq_len * size,
                        actual: view.len() * size,
                    }
                    .into());
                }
                Ok(())
            })?;
        }
        for (slot, values) in self.slots.into_iter().zip(sequences) {
            write_slot(graph, slot, |view| {
                view.typed_mut::<i64>()?.copy_from_slice(values)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl SyntheticBinding {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements `N` the counting sequence fills.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Writes `1, 2, …, N` into the bound slot in its declared type.
    pub fn write<G>(&self, graph: &mut G) -> Result<(), ContractViolation>
    where
        G: GraphInstance + ?Sized,
    {
        match self.dtype {
            DType::Int8 => self.write_counting::<i8, G>(graph),
            DType::Int16 => self.write_counting::<i16, G>(graph),
            DType::Int32 => self.write_counting::<i32, G>(graph),
            DType::Int64 => self.write_counting::<i64, G>(graph),
            DType::UInt8 => self.write_counting::<u8, G>(graph),
            DType::UInt16 => self.write_counting::<u16, G>(graph),
            DType::UInt32 => self.write_counting::<u32, G>(graph),
            DType::UInt64 => self.write_counting::<u64, G>(graph),
            other => Err(ContractViolation::ElementType {
                slot: self.slot,
                name: self.name.clone(),
                expected: "an integer type",
                actual: other,
            }),
        }
    }

    fn write_counting<T, G>(&self, graph: &mut G) -> Result<(), ContractViolation>
    where
        T: Element + TryFrom<usize>,
        G: GraphInstance + ?Sized,
    {
        let values = (1..=self.count)
            .map(|v| {
                T::try_from(v).map_err(|_| ContractViolation::Overflow {
                    slot: self.slot,
                    name: self.name.clone(),
                    dtype: self.dtype,
                    count: self.count,
                })
            })
            .collect::<Result<Vec<T>, _>>()?;
        write_slot(graph, self.slot, |view| {
            view.typed_mut::<T>()?.copy_from_slice(&values)?;
            Ok(())
        })
    }
}

fn write_slot<G, F>(graph: &mut G, slot: usize, write: F) -> Result<(), ContractViolation>
where
    G: GraphInstance + ?Sized,
    F: FnOnce(TensorSlotMut<'_>) -> Result<(), RuntimeError>,
{
    graph
        .input_mut(slot)
        .and_then(write)
        .map_err(|source| ContractViolation::Slot { slot, source })
}
