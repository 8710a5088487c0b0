// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//!
//! Benchmark: positional iteration vs hand-written field access
//!
//! The derived visitors and tuples should compile down to the same code as
//! touching each field directly. Named iteration adds one registry lookup.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fieldwise::{Error, FieldDescriptor, NamedVisitor, Record, Registry, Visitor};
use std::any::Any;
use std::convert::Infallible;

#[derive(Record, Clone)]
struct Telemetry {
    seq: u64,
    x: f64,
    y: f64,
    z: f64,
    status: u32,
    label: String,
}

fn telemetry() -> Telemetry {
    Telemetry {
        seq: 42,
        x: 1.0,
        y: 2.0,
        z: 3.0,
        status: 7,
        label: "imu".to_string(),
    }
}

/// Sums every numeric field.
struct Sum(f64);

impl Sum {
    fn add<F: Any>(&mut self, field: &F) {
        let any = field as &dyn Any;
        if let Some(v) = any.downcast_ref::<f64>() {
            self.0 += *v;
        } else if let Some(v) = any.downcast_ref::<u64>() {
            self.0 += *v as f64;
        } else if let Some(v) = any.downcast_ref::<u32>() {
            self.0 += f64::from(*v);
        }
    }
}

impl Visitor for Sum {
    type Error = Infallible;

    fn visit<F: Any>(&mut self, _position: usize, field: &F) -> Result<(), Infallible> {
        self.add(field);
        Ok(())
    }
}

impl NamedVisitor for Sum {
    type Error = Error;

    fn visit_named<F: Any>(
        &mut self,
        field: &F,
        _descriptor: &FieldDescriptor,
    ) -> Result<(), Error> {
        self.add(field);
        Ok(())
    }
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    let sample = telemetry();

    group.bench_function("hand_written", |b| {
        b.iter(|| {
            let t = black_box(&sample);
            black_box(t.seq as f64 + t.x + t.y + t.z + f64::from(t.status))
        });
    });

    group.bench_function("for_each", |b| {
        b.iter(|| {
            let mut sum = Sum(0.0);
            fieldwise::for_each(black_box(&sample), &mut sum).expect("infallible");
            black_box(sum.0)
        });
    });

    let registry = Registry::new();
    registry
        .register_declaration::<Telemetry>(
            "struct Telemetry { uint64_t seq; double x, y, z; uint32_t status; std::string label; };",
        )
        .expect("declaration registers");

    group.bench_function("for_each_named", |b| {
        b.iter(|| {
            let mut sum = Sum(0.0);
            registry
                .for_each_named(black_box(&sample), &mut sum)
                .expect("registered");
            black_box(sum.0)
        });
    });

    group.finish();
}

fn bench_tuples(c: &mut Criterion) {
    let mut group = c.benchmark_group("tuples");
    let sample = telemetry();

    group.bench_function("tie", |b| {
        b.iter(|| {
            let (seq, x, ..) = fieldwise::tie(black_box(&sample));
            black_box(*seq as f64 + *x)
        });
    });

    group.bench_function("make_tuple", |b| {
        b.iter(|| black_box(fieldwise::make_tuple(black_box(&sample))));
    });

    group.bench_function("clone_baseline", |b| {
        b.iter(|| black_box(black_box(&sample).clone()));
    });

    group.finish();
}

criterion_group!(benches, bench_iteration, bench_tuples);
criterion_main!(benches);
