use control::transport::{Local, Transport};
use control::Side;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::init::init_globals;
use engine::Limits;

use std::time::Duration;

fn engine_turn(local: &mut Local, limits: &Limits) {
    let (mov, _) = local.search_best_move(Side::White, limits).unwrap();
    black_box(mov);
}

fn engine_turn_benchmark(c: &mut Criterion) {
    init_globals();

    let mut local =
        Local::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3").unwrap();
    let limits = Limits::new(3, Duration::from_secs(60));
    c.bench_function("engine turn depth 3", |b| {
        b.iter(|| engine_turn(black_box(&mut local), &limits));
    });
}

criterion_group!(benches, engine_turn_benchmark);
criterion_main!(benches);
