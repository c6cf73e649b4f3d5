// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reading and writing model files.
//!
//! A model file is a single SafeTensors container: constant tensors live in
//! the body, and the graph description sits in the header metadata under
//! [`GRAPH_METADATA_KEY`](crate::GRAPH_METADATA_KEY). The whole file is read
//! before any check runs.

use crate::{Model, ModelError};
use std::path::Path;

/// Loads and stores [`Model`]s on disk.
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let model = ModelLoader::load(Path::new("./models/bert-tiny.safetensors")).unwrap();
/// println!("{}", model.summary());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Reads the file fully, then decodes and checks it.
    pub fn load(path: &Path) -> Result<Model, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read model file");

        let model = Model::from_bytes(&bytes)?;
        tracing::info!("{}", model.summary());
        Ok(model)
    }

    /// Encodes `model` and writes it to `path`.
    pub fn save(model: &Model, path: &Path) -> Result<(), ModelError> {
        let bytes = model.to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelBuilder;
    use tensor_core::{DType, Shape};

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");

        let mut b = ModelBuilder::new("fc");
        let x = b.input("x", DType::Float32, Shape::matrix(1, 2));
        let w = b.constant("w", Shape::matrix(1, 2), &[0.5f32, 0.25]).unwrap();
        let y = b.tensor("y", DType::Float32, Shape::matrix(1, 1));
        b.operator("FULLY_CONNECTED", &[x, w], &[y]).output(y);
        let model = b.build().unwrap();

        ModelLoader::save(&model, &path).unwrap();
        let loaded = ModelLoader::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::load(&dir.path().join("absent.safetensors")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
        assert!(err.to_string().contains("absent.safetensors"));
    }

    /// A container whose only content is the given graph description.
    fn write_graph_only(path: &Path, graph_json: &str) {
        let metadata = std::collections::HashMap::from([(
            crate::GRAPH_METADATA_KEY.to_string(),
            graph_json.to_string(),
        )]);
        let no_tensors: Vec<(&str, safetensors::tensor::TensorView<'_>)> = Vec::new();
        std::fs::write(path, safetensors::serialize(no_tensors, &Some(metadata)).unwrap()).unwrap();
    }

    #[test]
    fn test_oversized_input_shape_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.safetensors");
        let huge = usize::MAX / 2;
        write_graph_only(
            &path,
            &format!(
                r#"{{"name": "huge", "tensors": [{{"name": "x", "dtype": "int32", "shape": [{huge}, 3]}}],
                    "inputs": [0], "outputs": [0]}}"#
            ),
        );
        let err = ModelLoader::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::InvalidGraph(_)), "{err:?}");
    }

    #[test]
    fn test_builder_refuses_oversized_shape() {
        let mut b = ModelBuilder::new("huge");
        let x = b.input("x", DType::Int32, Shape::matrix(usize::MAX / 2, 3));
        b.output(x);
        assert!(matches!(b.build(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_garbage_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"\x00\x01\x02").unwrap();
        assert!(matches!(
            ModelLoader::load(file.path()),
            Err(ModelError::Container(_))
        ));
    }
}
