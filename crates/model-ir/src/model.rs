// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The loaded, immutable model.

use crate::manifest::{GraphManifest, OperatorDecl, TensorDecl, GRAPH_METADATA_KEY};
use crate::ModelError;
use safetensors::{Dtype, SafeTensors};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tensor_core::{DType, TensorInfo};

/// A computation graph plus the bytes of its constant tensors.
///
/// Never mutated after construction; graph instances copy constants into
/// their own slot storage.
#[derive(Clone, PartialEq)]
pub struct Model {
    manifest: GraphManifest,
    /// Constant data keyed by tensor index.
    constants: BTreeMap<usize, Vec<u8>>,
}

impl Model {
    /// Decodes and checks a container held in memory.
    ///
    /// Checks, in order: SafeTensors encoding, presence of the graph
    /// metadata entry, JSON schema, index ranges and slot roles, then every
    /// constant against its declaration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let (_, metadata) = SafeTensors::read_metadata(bytes)
            .map_err(|e| ModelError::Container(e.to_string()))?;
        let graph_json = metadata
            .metadata()
            .as_ref()
            .and_then(|m| m.get(GRAPH_METADATA_KEY))
            .ok_or(ModelError::MissingGraph {
                key: GRAPH_METADATA_KEY,
            })?;
        let manifest = GraphManifest::from_json(graph_json)?;
        manifest.validate()?;

        let body = SafeTensors::deserialize(bytes)
            .map_err(|e| ModelError::Container(e.to_string()))?;

        let mut constants = BTreeMap::new();
        for (index, decl) in manifest.tensors.iter().enumerate() {
            if !decl.constant {
                continue;
            }
            let constant_err = |detail: String| ModelError::Constant {
                name: decl.name.clone(),
                detail,
            };
            let view = body
                .tensor(&decl.name)
                .map_err(|_| constant_err("not present in container".into()))?;

            let stored = from_safetensors_dtype(view.dtype());
            if stored != Some(decl.dtype) {
                return Err(constant_err(format!(
                    "declared {}, stored as {:?}",
                    decl.dtype,
                    view.dtype()
                )));
            }
            if view.shape() != decl.shape.dims() {
                return Err(constant_err(format!(
                    "declared shape {}, stored shape {:?}",
                    decl.shape,
                    view.shape()
                )));
            }
            constants.insert(index, view.data().to_vec());
        }

        Ok(Self {
            manifest,
            constants,
        })
    }

    /// Assembles a model from parts and applies the same checks as loading.
    pub(crate) fn from_parts(
        manifest: GraphManifest,
        constants: BTreeMap<usize, Vec<u8>>,
    ) -> Result<Self, ModelError> {
        manifest.validate()?;
        for (index, decl) in manifest.tensors.iter().enumerate() {
            match (decl.constant, constants.get(&index)) {
                (true, None) => {
                    return Err(ModelError::Constant {
                        name: decl.name.clone(),
                        detail: "no data supplied".into(),
                    })
                }
                (false, Some(_)) => {
                    return Err(ModelError::Constant {
                        name: decl.name.clone(),
                        detail: "data supplied for a non-constant tensor".into(),
                    })
                }
                _ => {}
            }
        }
        Ok(Self {
            manifest,
            constants,
        })
    }

    /// Encodes this model as a SafeTensors container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let mut views = Vec::with_capacity(self.constants.len());
        for (&index, data) in &self.constants {
            let decl = &self.manifest.tensors[index];
            let dtype = to_safetensors_dtype(decl.dtype).ok_or_else(|| ModelError::Constant {
                name: decl.name.clone(),
                detail: format!("{} cannot be stored as a constant", decl.dtype),
            })?;
            let view = safetensors::tensor::TensorView::new(dtype, decl.shape.dims().to_vec(), data)
                .map_err(|e| ModelError::Constant {
                    name: decl.name.clone(),
                    detail: e.to_string(),
                })?;
            views.push((decl.name.clone(), view));
        }

        let metadata = HashMap::from([(GRAPH_METADATA_KEY.to_string(), self.manifest.to_json()?)]);
        safetensors::serialize(views, &Some(metadata))
            .map_err(|e| ModelError::Container(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &GraphManifest {
        &self.manifest
    }

    pub fn tensors(&self) -> &[TensorDecl] {
        &self.manifest.tensors
    }

    pub fn tensor_info(&self, index: usize) -> Option<TensorInfo> {
        self.manifest.tensors.get(index).map(TensorDecl::info)
    }

    pub fn inputs(&self) -> &[usize] {
        &self.manifest.inputs
    }

    pub fn outputs(&self) -> &[usize] {
        &self.manifest.outputs
    }

    pub fn operators(&self) -> &[OperatorDecl] {
        &self.manifest.operators
    }

    /// Raw little-endian bytes of a constant tensor.
    pub fn constant_data(&self, index: usize) -> Option<&[u8]> {
        self.constants.get(&index).map(Vec::as_slice)
    }

    /// Total bytes of constant data.
    pub fn constant_bytes(&self) -> usize {
        self.constants.values().map(Vec::len).sum()
    }

    /// Returns a one-line summary string.
    pub fn summary(&self) -> String {
        format!(
            "Model '{}': {} tensors ({} constant, {:.1} KB), {} inputs, {} outputs, {} operators",
            self.manifest.name,
            self.manifest.tensors.len(),
            self.constants.len(),
            self.constant_bytes() as f64 / 1024.0,
            self.manifest.inputs.len(),
            self.manifest.outputs.len(),
            self.manifest.operators.len(),
        )
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.manifest.name)
            .field("tensors", &self.manifest.tensors.len())
            .field("operators", &self.manifest.operators.len())
            .field("constant_bytes", &self.constant_bytes())
            .finish()
    }
}

fn to_safetensors_dtype(dtype: DType) -> Option<Dtype> {
    Some(match dtype {
        DType::Bool => Dtype::BOOL,
        DType::UInt8 => Dtype::U8,
        DType::Int8 => Dtype::I8,
        DType::Int16 => Dtype::I16,
        DType::UInt16 => Dtype::U16,
        DType::Float16 => Dtype::F16,
        DType::Int32 => Dtype::I32,
        DType::UInt32 => Dtype::U32,
        DType::Float32 => Dtype::F32,
        DType::Float64 => Dtype::F64,
        DType::Int64 => Dtype::I64,
        DType::UInt64 => Dtype::U64,
        _ => return None,
    })
}

fn from_safetensors_dtype(dtype: Dtype) -> Option<DType> {
    Some(match dtype {
        Dtype::BOOL => DType::Bool,
        Dtype::U8 => DType::UInt8,
        Dtype::I8 => DType::Int8,
        Dtype::I16 => DType::Int16,
        Dtype::U16 => DType::UInt16,
        Dtype::F16 => DType::Float16,
        Dtype::I32 => DType::Int32,
        Dtype::U32 => DType::UInt32,
        Dtype::F32 => DType::Float32,
        Dtype::F64 => DType::Float64,
        Dtype::I64 => DType::Int64,
        Dtype::U64 => DType::UInt64,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelBuilder;
    use tensor_core::Shape;

    fn tiny() -> Model {
        let mut b = ModelBuilder::new("tiny");
        let ids = b.input("ids", DType::Int64, Shape::matrix(1, 3));
        let table = b
            .constant("table", Shape::matrix(4, 2), &[0.0f32, 0.1, 1.0, 1.1, 2.0, 2.1, 3.0, 3.1])
            .unwrap();
        let emb = b.tensor("emb", DType::Float32, Shape::new(vec![1, 3, 2]));
        b.operator("EMBEDDING_LOOKUP", &[ids, table], &[emb]);
        b.output(emb);
        b.build().unwrap()
    }

    #[test]
    fn test_bytes_roundtrip() {
        let model = tiny();
        let bytes = model.to_bytes().unwrap();
        let back = Model::from_bytes(&bytes).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.constant_data(1).unwrap().len(), 8 * 4);
        assert_eq!(back.inputs(), &[0]);
        assert_eq!(back.outputs(), &[2]);
    }

    #[test]
    fn test_not_a_container() {
        assert!(matches!(
            Model::from_bytes(b"definitely not safetensors"),
            Err(ModelError::Container(_))
        ));
    }

    #[test]
    fn test_missing_graph_metadata() {
        let data = [0u8; 4];
        let view = safetensors::tensor::TensorView::new(Dtype::F32, vec![1], &data).unwrap();
        let bytes = safetensors::serialize(vec![("w", view)], &None).unwrap();
        assert!(matches!(
            Model::from_bytes(&bytes),
            Err(ModelError::MissingGraph { .. })
        ));
    }

    #[test]
    fn test_malformed_graph_json() {
        let metadata = HashMap::from([(GRAPH_METADATA_KEY.to_string(), "{not json".to_string())]);
        let bytes = safetensors::serialize(
            Vec::<(String, safetensors::tensor::TensorView<'_>)>::new(),
            &Some(metadata),
        )
        .unwrap();
        assert!(matches!(
            Model::from_bytes(&bytes),
            Err(ModelError::GraphParse(_))
        ));
    }

    #[test]
    fn test_constant_dtype_disagreement() {
        let mut manifest = tiny().manifest().clone();
        manifest.tensors[1].dtype = DType::Float64;
        let data = [0u8; 32];
        let view =
            safetensors::tensor::TensorView::new(Dtype::F32, vec![4, 2], &data).unwrap();
        let metadata = HashMap::from([(GRAPH_METADATA_KEY.to_string(), manifest.to_json().unwrap())]);
        let bytes = safetensors::serialize(vec![("table", view)], &Some(metadata)).unwrap();
        assert!(matches!(
            Model::from_bytes(&bytes),
            Err(ModelError::Constant { .. })
        ));
    }

    #[test]
    fn test_constant_missing_from_body() {
        let manifest = tiny().manifest().clone();
        let metadata = HashMap::from([(GRAPH_METADATA_KEY.to_string(), manifest.to_json().unwrap())]);
        let bytes = safetensors::serialize(
            Vec::<(String, safetensors::tensor::TensorView<'_>)>::new(),
            &Some(metadata),
        )
        .unwrap();
        let err = Model::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("not present in container"));
    }

    #[test]
    fn test_summary() {
        let s = tiny().summary();
        assert!(s.contains("'tiny'"));
        assert!(s.contains("1 constant"));
        assert!(s.contains("1 operators"));
    }
}
