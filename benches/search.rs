//! Search benchmarks.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - Static evaluation of an opening and a midgame position
//! - Alpha-beta search at increasing depths
//! - MCTS with fixed iteration budgets

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use connect_four::board::{Board, Player, apply_action};
use connect_four::config::MctsConfig;
use connect_four::heuristic::evaluate;
use connect_four::mcts::Mcts;
use connect_four::minimax::best_move;

/// Board after alternately playing `columns`, player one first.
fn play_moves(columns: &[usize]) -> Board {
    let mut board = Board::new();
    let mut player = Player::One;
    for &column in columns {
        board = apply_action(&board, column, player).unwrap();
        player = player.other();
    }
    board
}

fn midgame() -> Board {
    play_moves(&[3, 3, 4, 2, 2, 4, 5, 1, 1, 6])
}

// =============================================================================
// Heuristic
// =============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let opening = play_moves(&[3]);
    let middle = midgame();

    group.bench_function("opening", |b| b.iter(|| evaluate(black_box(&opening), Player::Two, true)));
    group.bench_function("midgame", |b| b.iter(|| evaluate(black_box(&middle), Player::One, true)));
    group.finish();
}

// =============================================================================
// Alpha-beta
// =============================================================================

fn bench_alphabeta_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("alphabeta_depth");
    let board = midgame();

    for depth in [2u32, 4, 6] {
        group.bench_with_input(BenchmarkId::new("midgame", depth), &depth, |b, &depth| {
            b.iter(|| best_move(black_box(&board), Player::One, depth).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// MCTS
// =============================================================================

fn bench_mcts_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_iterations");

    for iterations in [100u32, 400, 1600] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(BenchmarkId::new("opening", iterations), &iterations, |b, &iterations| {
            let config = MctsConfig::with_iterations(iterations);
            b.iter(|| {
                let mut rng = fastrand::Rng::with_seed(42);
                let mut tree = Mcts::new(&Board::new(), Player::One, config);
                tree.run(&mut rng).unwrap();
                black_box(tree.best_action())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_alphabeta_depth, bench_mcts_iterations);
criterion_main!(benches);
