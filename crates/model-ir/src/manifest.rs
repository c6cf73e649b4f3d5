// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON graph description stored in the container header.
//!
//! # Format
//! ```json
//! {
//!   "name": "bert-tiny",
//!   "tensors": [
//!     {"name": "input_ids", "dtype": "int64", "shape": [1, 8]},
//!     {"name": "word_embeddings", "dtype": "float32", "shape": [30, 4], "constant": true}
//!   ],
//!   "inputs": [0],
//!   "outputs": [2],
//!   "operators": [{"op": "EMBEDDING_LOOKUP", "inputs": [0, 1], "outputs": [2]}]
//! }
//! ```

use crate::ModelError;
use std::collections::HashSet;
use tensor_core::{DType, QuantParams, Shape, TensorInfo};

/// Header metadata key holding the graph description.
pub const GRAPH_METADATA_KEY: &str = "edge_infer.graph";

/// Top-level graph description.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphManifest {
    pub name: String,
    pub tensors: Vec<TensorDecl>,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    #[serde(default)]
    pub operators: Vec<OperatorDecl>,
}

/// One tensor slot declaration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorDecl {
    pub name: String,
    pub dtype: DType,
    pub shape: Shape,
    /// Backed by a tensor of the same name in the container body.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub constant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization: Option<QuantParams>,
}

impl TensorDecl {
    /// Rejects shapes whose storage could never be allocated.
    ///
    /// Types without a fixed layout (strings, resources) are sized by the
    /// runtime and only need a representable element count.
    fn check_extent(&self) -> Result<(), ModelError> {
        let too_large = || {
            ModelError::InvalidGraph(format!(
                "tensor '{}' of shape {} is too large",
                self.name, self.shape
            ))
        };
        let elements = self.shape.checked_num_elements().ok_or_else(too_large)?;
        if self.dtype.byte_size_for(1).is_none() {
            return Ok(());
        }
        match self.dtype.byte_size_for(elements) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(()),
            _ => Err(too_large()),
        }
    }

    pub fn info(&self) -> TensorInfo {
        let info = TensorInfo::new(self.name.clone(), self.dtype, self.shape.clone());
        match self.quantization {
            Some(q) => info.with_quantization(q),
            None => info,
        }
    }
}

/// One operator node: an operator name and the slot indices it reads and writes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperatorDecl {
    pub op: String,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
}

impl GraphManifest {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks index ranges and slot roles.
    ///
    /// - every index in `inputs`, `outputs` and operator wiring is in range;
    /// - tensor names are unique;
    /// - every sized tensor's element count and byte size fit in memory;
    /// - no graph input is a constant;
    /// - no operator writes a constant or a graph input.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.tensors.len();
        let check = |what: &str, idx: usize| {
            if idx < n {
                Ok(())
            } else {
                Err(ModelError::InvalidGraph(format!(
                    "{what} refers to tensor {idx}, but only {n} tensors are declared"
                )))
            }
        };

        let mut names = HashSet::new();
        for t in &self.tensors {
            if !names.insert(t.name.as_str()) {
                return Err(ModelError::InvalidGraph(format!(
                    "duplicate tensor name '{}'",
                    t.name
                )));
            }
            t.check_extent()?;
        }

        for &i in &self.inputs {
            check("graph input", i)?;
            if self.tensors[i].constant {
                return Err(ModelError::InvalidGraph(format!(
                    "graph input '{}' is declared constant",
                    self.tensors[i].name
                )));
            }
        }
        for &i in &self.outputs {
            check("graph output", i)?;
        }

        let inputs: HashSet<usize> = self.inputs.iter().copied().collect();
        for (node, op) in self.operators.iter().enumerate() {
            for &i in &op.inputs {
                check(&format!("node {node} ({}) input", op.op), i)?;
            }
            for &i in &op.outputs {
                check(&format!("node {node} ({}) output", op.op), i)?;
                if self.tensors[i].constant || inputs.contains(&i) {
                    return Err(ModelError::InvalidGraph(format!(
                        "node {node} ({}) writes read-only tensor '{}'",
                        op.op, self.tensors[i].name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "name": "tiny",
            "tensors": [
                {"name": "ids", "dtype": "int64", "shape": [1, 4]},
                {"name": "table", "dtype": "float32", "shape": [10, 2], "constant": true},
                {"name": "emb", "dtype": "float32", "shape": [1, 4, 2]},
                {"name": "q", "dtype": "uint8", "shape": [2],
                 "quantization": {"scale": 0.5, "zero_point": 128}}
            ],
            "inputs": [0],
            "outputs": [2],
            "operators": [{"op": "EMBEDDING_LOOKUP", "inputs": [0, 1], "outputs": [2]}]
        }"#
    }

    #[test]
    fn test_parse_and_validate() {
        let m = GraphManifest::from_json(sample()).unwrap();
        assert_eq!(m.name, "tiny");
        assert_eq!(m.tensors.len(), 4);
        assert_eq!(m.tensors[0].dtype, DType::Int64);
        assert!(m.tensors[1].constant);
        assert_eq!(m.tensors[3].quantization, Some(QuantParams::new(0.5, 128)));
        m.validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip_omits_defaults() {
        let m = GraphManifest::from_json(sample()).unwrap();
        let json = m.to_json().unwrap();
        assert!(!json.contains("\"constant\":false"));
        assert_eq!(GraphManifest::from_json(&json).unwrap(), m);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        m.outputs = vec![9];
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("graph output refers to tensor 9"));
    }

    #[test]
    fn test_constant_input_rejected() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        m.inputs = vec![1];
        assert!(matches!(m.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_operator_writing_input_rejected() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        m.operators[0].outputs = vec![0];
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_overflowing_shape_rejected() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        m.tensors[0].shape = Shape::matrix(usize::MAX / 2, 3);
        let err = m.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidGraph(_)));
        assert!(err.to_string().contains("'ids'"));
    }

    #[test]
    fn test_unaddressable_byte_size_rejected() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        // Fits as an element count, not as int64 bytes.
        m.tensors[0].shape = Shape::vector(usize::MAX / 4);
        assert!(matches!(m.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut m = GraphManifest::from_json(sample()).unwrap();
        m.tensors[2].name = "ids".into();
        assert!(m.validate().is_err());
    }
}
