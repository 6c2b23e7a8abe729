use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kiikku::{
    generate_level, FrameInput, GameState, GenerationConfig, LightSource, Position,
    SessionConfig, SpatialGrid, VisibilityEngine,
};

fn bench_visibility(c: &mut Criterion) {
    let grid = SpatialGrid::walled_arena(64, 64);
    let observer = LightSource::new(Position::from_tile(32, 32), 8);
    let emitters: Vec<LightSource> = (0..8)
        .map(|i| LightSource::new(Position::from_tile(28 + i, 30), 4))
        .collect();
    let engine = VisibilityEngine::new();

    c.bench_function("visibility_pass", |b| {
        b.iter(|| engine.compute(black_box(&grid), black_box(observer), black_box(&emitters)))
    });
}

fn bench_generation(c: &mut Criterion) {
    let config = GenerationConfig::for_testing(42);
    c.bench_function("generate_small_level", |b| {
        b.iter(|| generate_level(black_box(&config)))
    });
}

fn bench_tick(c: &mut Criterion) {
    let config = GenerationConfig::for_testing(7);
    let Ok(mut state) = GameState::new_game(&config, SessionConfig::default()) else {
        return;
    };
    let input = FrameInput::idle(1.0 / 60.0);
    c.bench_function("idle_tick", |b| b.iter(|| state.tick(black_box(&input))));
}

criterion_group!(benches, bench_visibility, bench_generation, bench_tick);
criterion_main!(benches);
