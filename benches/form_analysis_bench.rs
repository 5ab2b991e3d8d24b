// ABOUTME: Criterion benchmarks for the form analysis pipeline
// ABOUTME: Measures preprocessing, per-frame session analysis, optimization and batch sequences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the form analysis pipeline.
//!
//! Measures landmark preprocessing at several sequence lengths, the cost of
//! one live-session frame with a full history, the optimization engine from
//! seeded random starting poses, and whole-sequence batch analysis.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs
)]

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use form_coach::core::models::{ExerciseType, Joint, JointAngleSet, PoseSequence, UserProfile};
use form_coach::intelligence::{
    LandmarkPreprocessor, OptimizationEngine, PhaseDetector, SyntheticPoseGenerator,
};
use form_coach::{FormAnalysisConfig, FormAnalysisService, PoseDetection};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 42;

fn squat_sequence(repetitions: usize) -> PoseSequence {
    SyntheticPoseGenerator::new(SEED)
        .with_repetitions(repetitions)
        .squat_sequence()
        .expect("positive frame rate")
}

fn service() -> FormAnalysisService {
    FormAnalysisService::new(FormAnalysisConfig::default()).expect("default configuration")
}

fn user() -> UserProfile {
    UserProfile::new(178.0, 80.0)
}

/// Benchmark preprocessing and phase detection over growing sequences
fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let preprocessor = LandmarkPreprocessor::default();
    let detector = PhaseDetector::default();

    for repetitions in [1, 5, 20] {
        let sequence = squat_sequence(repetitions);
        group.throughput(Throughput::Elements(sequence.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("preprocess", sequence.len()),
            &sequence,
            |b, sequence| b.iter(|| preprocessor.preprocess(black_box(sequence)).unwrap()),
        );

        let clean = preprocessor.preprocess(&sequence).unwrap();
        group.bench_with_input(
            BenchmarkId::new("detect_phases", clean.len()),
            &clean,
            |b, clean| b.iter(|| detector.detect(black_box(clean), ExerciseType::Squat)),
        );
    }
    group.finish();
}

/// Benchmark one live-session frame once the rolling history is full
fn bench_session_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_frame");
    group.throughput(Throughput::Elements(1));
    let service = service();
    let sequence = squat_sequence(2);
    let frames = sequence.frames();
    let capacity = service.pipeline().config().aggregation.history_capacity;

    group.bench_function("analyze_frame_full_history", |b| {
        b.iter_batched(
            || {
                let mut session = service
                    .start_session(ExerciseType::Squat, user(), sequence.frame_rate())
                    .unwrap();
                for frame in &frames[..capacity] {
                    session
                        .analyze_frame(
                            frame.timestamp,
                            PoseDetection::Detected(frame.landmarks.clone()),
                            None,
                        )
                        .unwrap();
                }
                session
            },
            |mut session| {
                let next = &frames[capacity];
                session
                    .analyze_frame(
                        next.timestamp,
                        PoseDetection::Detected(next.landmarks.clone()),
                        None,
                    )
                    .unwrap()
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

/// Benchmark the solver chain from seeded random squat poses
fn bench_optimization(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimization");
    let engine = OptimizationEngine::default();
    let user = user();
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let starts: Vec<JointAngleSet> = (0..16)
        .map(|_| {
            JointAngleSet::new()
                .with(Joint::Knee, rng.gen_range(60.0..175.0))
                .with(Joint::Hip, rng.gen_range(60.0..175.0))
                .with(Joint::Spine, rng.gen_range(0.0..60.0))
                .with(Joint::Ankle, rng.gen_range(65.0..110.0))
        })
        .collect();

    group.throughput(Throughput::Elements(starts.len() as u64));
    group.bench_function("optimize_squat", |b| {
        b.iter(|| {
            for current in &starts {
                black_box(
                    engine
                        .optimize(black_box(current), &user, ExerciseType::Squat)
                        .unwrap(),
                );
            }
        });
    });
    group.finish();
}

/// Benchmark batch analysis of whole recorded sequences
fn bench_sequence_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_analysis");
    group.sample_size(10);
    let service = service();
    let user = user();

    for repetitions in [1, 5] {
        let sequence = squat_sequence(repetitions);
        group.throughput(Throughput::Elements(sequence.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("analyze_sequence", sequence.len()),
            &sequence,
            |b, sequence| {
                b.iter(|| {
                    service
                        .analyze_sequence(black_box(sequence), "squat", &user)
                        .unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_preprocessing,
    bench_session_frame,
    bench_optimization,
    bench_sequence_analysis
);
criterion_main!(benches);
