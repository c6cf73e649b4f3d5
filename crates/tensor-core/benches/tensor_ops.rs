// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the reference kernels.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensor_core::{ops, DType, Shape, Tensor};

fn filled(shape: Shape) -> Tensor {
    let n = shape.num_elements();
    let values: Vec<f32> = (0..n).map(|i| (i % 17) as f32 * 0.1).collect();
    Tensor::from_values(shape, &values).unwrap()
}

fn bench_fully_connected(c: &mut Criterion) {
    let mut group = c.benchmark_group("fully_connected");
    for &seq_len in &[16usize, 64, 128] {
        let input = filled(Shape::new(vec![1, seq_len, 256]));
        let weights = filled(Shape::matrix(256, 256));
        let mut output = Tensor::zeros(Shape::new(vec![1, seq_len, 256]), DType::Float32).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(seq_len), &seq_len, |b, _| {
            b.iter(|| {
                ops::fully_connected(&input.view(), &weights.view(), None, &mut output).unwrap();
                black_box(&output);
            })
        });
    }
    group.finish();
}

fn bench_softmax(c: &mut Criterion) {
    let input = filled(Shape::matrix(128, 128));
    let mut output = Tensor::zeros(Shape::matrix(128, 128), DType::Float32).unwrap();
    c.bench_function("softmax_128x128", |b| {
        b.iter(|| {
            ops::softmax(&input.view(), &mut output).unwrap();
            black_box(&output);
        })
    });
}

fn bench_cast(c: &mut Criterion) {
    let ids: Vec<i64> = (0..4096).collect();
    let input = Tensor::from_values(Shape::matrix(1, 4096), &ids).unwrap();
    let mut output = Tensor::zeros(Shape::matrix(1, 4096), DType::Float32).unwrap();
    c.bench_function("cast_i64_f32_4096", |b| {
        b.iter(|| {
            ops::cast(&input.view(), &mut output).unwrap();
            black_box(&output);
        })
    });
}

criterion_group!(benches, bench_fully_connected, bench_softmax, bench_cast);
criterion_main!(benches);
