// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: model container → interpreter → forward pass.
//!
//! The test model is a small encoder head with three int64 inputs
//! (token ids, segment ids, attention mask), a quantized weight that is
//! dequantized in-graph, and a masked softmax output.

use model_ir::{Model, ModelBuilder, ModelLoader};
use runtime::{GraphInstance, Interpreter, Runtime, RuntimeError};
use tensor_core::{DType, QuantParams, Shape};

const SEQ: usize = 8;
const HIDDEN: usize = 4;

// ── Helpers ────────────────────────────────────────────────────

fn tiny_encoder() -> Model {
    let mut b = ModelBuilder::new("tiny_encoder");
    let seq = |d: usize| Shape::new(vec![1, SEQ, d]);

    let ids = b.input("input_ids", DType::Int64, Shape::matrix(1, SEQ));
    let segments = b.input("segment_ids", DType::Int64, Shape::matrix(1, SEQ));
    let mask = b.input("input_mask", DType::Int64, Shape::matrix(1, SEQ));

    let tok_table: Vec<f32> = (0..6 * HIDDEN).map(|i| (i % 7) as f32 * 0.1).collect();
    let tok_table = b.constant("tok_table", Shape::matrix(6, HIDDEN), &tok_table).unwrap();
    let seg_table: Vec<f32> = (0..2 * HIDDEN).map(|i| i as f32 * 0.05).collect();
    let seg_table = b.constant("seg_table", Shape::matrix(2, HIDDEN), &seg_table).unwrap();
    let gamma = b.constant("gamma", Shape::vector(HIDDEN), &[1.0f32; HIDDEN]).unwrap();
    let beta = b.constant("beta", Shape::vector(HIDDEN), &[0.0f32; HIDDEN]).unwrap();

    let w1_q: Vec<u8> = (0..HIDDEN * HIDDEN).map(|i| 120 + (i as u8 % 16)).collect();
    let w1_q = b.constant("w1_q", Shape::matrix(HIDDEN, HIDDEN), &w1_q).unwrap();
    b.quantize(w1_q, QuantParams::new(0.05, 128));
    let b1 = b.constant("b1", Shape::vector(HIDDEN), &[0.1f32, -0.1, 0.0, 0.2]).unwrap();
    let w2: Vec<f32> = (0..2 * HIDDEN).map(|i| if i % 3 == 0 { 0.5 } else { -0.25 }).collect();
    let w2 = b.constant("w2", Shape::matrix(2, HIDDEN), &w2).unwrap();

    let tok = b.tensor("tok", DType::Float32, seq(HIDDEN));
    let seg = b.tensor("seg", DType::Float32, seq(HIDDEN));
    let sum = b.tensor("sum", DType::Float32, seq(HIDDEN));
    let norm = b.tensor("norm", DType::Float32, seq(HIDDEN));
    let w1 = b.tensor("w1", DType::Float32, Shape::matrix(HIDDEN, HIDDEN));
    let hidden = b.tensor("hidden", DType::Float32, seq(HIDDEN));
    let act = b.tensor("act", DType::Float32, seq(HIDDEN));
    let logits = b.tensor("logits", DType::Float32, seq(2));
    let mask_f = b.tensor("mask_f", DType::Float32, Shape::matrix(1, SEQ));
    let mask_3d = b.tensor("mask_3d", DType::Float32, seq(1));
    let masked = b.tensor("masked", DType::Float32, seq(2));
    let probs = b.tensor("probs", DType::Float32, seq(2));

    b.operator("EMBEDDING_LOOKUP", &[ids, tok_table], &[tok])
        .operator("EMBEDDING_LOOKUP", &[segments, seg_table], &[seg])
        .operator("ADD", &[tok, seg], &[sum])
        .operator("LAYER_NORM", &[sum, gamma, beta], &[norm])
        .operator("DEQUANTIZE", &[w1_q], &[w1])
        .operator("FULLY_CONNECTED", &[norm, w1, b1], &[hidden])
        .operator("GELU", &[hidden], &[act])
        .operator("FULLY_CONNECTED", &[act, w2], &[logits])
        .operator("CAST", &[mask], &[mask_f])
        .operator("RESHAPE", &[mask_f], &[mask_3d])
        .operator("MUL", &[logits, mask_3d], &[masked])
        .operator("SOFTMAX", &[masked], &[probs])
        .output(masked)
        .output(probs);
    b.build().unwrap()
}

fn feed(graph: &mut dyn GraphInstance, ids: &[i64], mask: &[i64]) {
    let [ids_slot, seg_slot, mask_slot] = [graph.inputs()[0], graph.inputs()[1], graph.inputs()[2]];
    for (slot, values) in [(ids_slot, ids), (seg_slot, &[0i64; SEQ][..]), (mask_slot, mask)] {
        graph
            .input_mut(slot)
            .unwrap()
            .typed_mut::<i64>()
            .unwrap()
            .copy_from_slice(values)
            .unwrap();
    }
}

fn outputs(graph: &dyn GraphInstance) -> (Vec<f32>, Vec<f32>) {
    let masked = graph.tensor(graph.outputs()[0]).unwrap().to_vec::<f32>().unwrap();
    let probs = graph.tensor(graph.outputs()[1]).unwrap().to_vec::<f32>().unwrap();
    (masked, probs)
}

const IDS: [i64; SEQ] = [2, 4, 5, 3, 0, 0, 0, 0];
const MASK: [i64; SEQ] = [1, 1, 1, 1, 0, 0, 0, 0];

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn encoder_forward_pass_masks_padding() {
    let mut graph = Interpreter::new().build(tiny_encoder()).unwrap();
    assert_eq!(graph.nodes_len(), 12);
    graph.allocate().unwrap();
    feed(&mut graph, &IDS, &MASK);
    graph.execute().unwrap();

    let (masked, probs) = outputs(&graph);
    for pos in 4..SEQ {
        assert_eq!(&masked[pos * 2..pos * 2 + 2], &[0.0, 0.0]);
        assert_eq!(&probs[pos * 2..pos * 2 + 2], &[0.5, 0.5]);
    }
    for row in probs.chunks(2) {
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
    assert!(masked[..8].iter().any(|&v| v != 0.0));
}

#[test]
fn parallelism_does_not_change_results() {
    let run = |threads: usize| {
        let mut graph = Interpreter::new().build(tiny_encoder()).unwrap();
        graph.set_parallelism(threads).unwrap();
        graph.allocate().unwrap();
        feed(&mut graph, &IDS, &MASK);
        graph.execute().unwrap();
        outputs(&graph)
    };
    assert_eq!(run(0), run(1));
    assert_eq!(run(1), run(4));
}

#[test]
fn repeated_execution_is_deterministic() {
    let mut graph = Interpreter::new().build(tiny_encoder()).unwrap();
    graph.allocate().unwrap();
    feed(&mut graph, &IDS, &MASK);
    graph.execute().unwrap();
    let first = outputs(&graph);
    graph.execute().unwrap();
    assert_eq!(outputs(&graph), first);
    assert_eq!(graph.executions(), 2);
}

#[test]
fn loaded_model_matches_in_memory_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny_encoder.safetensors");
    ModelLoader::save(&tiny_encoder(), &path).unwrap();

    let interpreter = Interpreter::new();
    let mut from_file = interpreter.build(interpreter.load(&path).unwrap()).unwrap();
    let mut in_memory = interpreter.build(tiny_encoder()).unwrap();
    for graph in [&mut from_file, &mut in_memory] {
        graph.allocate().unwrap();
        feed(graph, &IDS, &MASK);
        graph.execute().unwrap();
    }
    assert_eq!(outputs(&from_file), outputs(&in_memory));
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Interpreter::new()
        .load(&dir.path().join("absent.safetensors"))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Load(_)));
}

#[test]
fn out_of_vocabulary_id_fails_execution() {
    let mut graph = Interpreter::new().build(tiny_encoder()).unwrap();
    graph.allocate().unwrap();
    feed(&mut graph, &[2, 4, 99, 3, 0, 0, 0, 0], &MASK);
    match graph.execute().unwrap_err() {
        RuntimeError::Kernel { node, op, .. } => {
            assert_eq!(node, 0);
            assert_eq!(op, "EMBEDDING_LOOKUP");
        }
        other => panic!("unexpected error: {other}"),
    }
}
