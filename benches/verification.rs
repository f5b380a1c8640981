//! Verification benchmark: probe vs enrolled templates across the sweep,
//! and a full course validation run.

use bioauth::config::EngineConfig;
use bioauth::features::{english_catalog, FeatureExtractor, Sample, FEATURE_SET_EN_US};
use bioauth::jobs::run_validation;
use bioauth::keymap;
use bioauth::keystroke::{CourseId, UserId};
use bioauth::synth::{generate_course, generate_session, TypistProfile};
use bioauth::verify::{KnnVerifier, Reference};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_samples(count: usize) -> Vec<Sample> {
    let catalog = english_catalog().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let keys = keymap::visible_keys();
    let extractor = FeatureExtractor::new(&catalog, 5);
    (0..count)
        .map(|i| {
            let profile = TypistProfile::sampled(&mut rng);
            let session = generate_session(&mut rng, &profile, &keys, 250);
            extractor
                .extract_sample(FEATURE_SET_EN_US, UserId(i as u64 % 4 + 1), &session)
                .unwrap()
        })
        .collect()
}

fn bench_knn_sweep(c: &mut Criterion) {
    let samples = make_samples(33);
    let (probe, enrolled) = samples.split_first().unwrap();
    let references: Vec<Reference<'_>> = enrolled
        .iter()
        .map(|s| Reference {
            sample: s,
            genuine: s.user == probe.user,
        })
        .collect();
    let verifier = KnnVerifier::new(EngineConfig::default().knn);

    c.bench_function("knn_sweep_32_references", |b| {
        b.iter(|| black_box(verifier.verify(black_box(probe), &references).unwrap()))
    });
}

fn bench_course_validation(c: &mut Criterion) {
    let catalog = english_catalog().unwrap();
    let config = EngineConfig::default();
    let mut rng = StdRng::seed_from_u64(4);
    let data = generate_course(&mut rng, CourseId(1), 4, 4, 200);

    c.bench_function("validate_course_4_users_16_sessions", |b| {
        b.iter(|| black_box(run_validation(black_box(&data), &catalog, &config).unwrap()))
    });
}

criterion_group!(benches, bench_knn_sweep, bench_course_validation);
criterion_main!(benches);
