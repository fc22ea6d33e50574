use criterion::{black_box, criterion_group, criterion_main, Criterion};

use DamIron::board::fen::parse_fen;
use DamIron::board::position::Position;
use DamIron::movegen::legal_moves::{gen_moves, MoveCache};
use DamIron::search::mtdbi::MtdSearch;

fn movegen_benchmark(c: &mut Criterion) {
    let initial = Position::initial();
    let tactical = parse_fen("W:W15,19,24,29,32,41,49,50:B5,8,30,35,37,40,42,45").unwrap();

    let mut group = c.benchmark_group("Move generation");
    group.bench_function("initial", |b| {
        b.iter(|| black_box(gen_moves(black_box(&initial))));
    });
    group.bench_function("tactical", |b| {
        b.iter(|| black_box(gen_moves(black_box(&tactical))));
    });
    group.finish();
}

fn search_benchmark(c: &mut Criterion) {
    let initial = Position::initial();

    let mut group = c.benchmark_group("Search");
    group.sample_size(20);
    group.bench_function("mtd 1000 nodes", |b| {
        b.iter(|| {
            let mut gen = MoveCache::new();
            let mut search = MtdSearch::with_budget(1000);
            black_box(search.search(&mut gen, black_box(&initial)))
        });
    });
    group.finish();
}

criterion_group!(benches, movegen_benchmark, search_benchmark);
criterion_main!(benches);
