//! Performance benchmarks for the enrichment pipeline.
//!
//! Run with: `cargo bench`
//!
//! Uses synthetic course and round data to measure per-fix enrichment
//! cost under realistic conditions for a golf companion backend.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linksight::engine::{LocationEngine, StaticCourseProvider};
use linksight::synthetic::{
    generate_course, generate_round, RoundScenarioConfig, SyntheticCourseConfig,
};
use linksight::{club, Coordinate, CourseGeometry, LocationFix};

fn fresh_engine(course: &CourseGeometry) -> LocationEngine {
    let mut provider = StaticCourseProvider::new();
    provider.insert(course.clone());
    LocationEngine::new(Box::new(provider))
}

fn bench_enrich_sequential(c: &mut Criterion) {
    let course = generate_course("bench-18", &SyntheticCourseConfig::default());
    let round = generate_round(&course, &RoundScenarioConfig::default());

    c.bench_function("enrich_full_round_sequential", |b| {
        b.iter_batched(
            || (fresh_engine(&course), round.fixes.clone()),
            |(mut engine, fixes): (LocationEngine, Vec<LocationFix>)| {
                for fix in fixes {
                    let _ = black_box(engine.enrich(fix));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_enrich_batch(c: &mut Criterion) {
    let course = generate_course("bench-18", &SyntheticCourseConfig::default());

    // Four players on the same course, one backlog
    let mut backlog = Vec::new();
    for player in 0u64..4 {
        let round = generate_round(
            &course,
            &RoundScenarioConfig {
                user_id: format!("player-{}", player),
                round_id: format!("round-{}", player),
                seed: 42 + player,
                ..RoundScenarioConfig::default()
            },
        );
        backlog.extend(round.fixes);
    }

    c.bench_function("enrich_batch_four_rounds", |b| {
        b.iter_batched(
            || (fresh_engine(&course), backlog.clone()),
            |(mut engine, fixes): (LocationEngine, Vec<LocationFix>)| {
                black_box(engine.enrich_batch(fixes));
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_target_advice(c: &mut Criterion) {
    let from = Coordinate::new(56.34, -2.80);
    let target = Coordinate::new(56.3422, -2.7988);

    c.bench_function("target_advice", |b| {
        b.iter(|| black_box(club::target_advice(black_box(&from), black_box(&target))))
    });
}

criterion_group!(
    benches,
    bench_enrich_sequential,
    bench_enrich_batch,
    bench_target_advice
);
criterion_main!(benches);
