//! Throughput of full random episodes and of state cloning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kuhhandel::core::RulesConfig;
use kuhhandel::env::{play_episode, random_agents, EnvConfig, EnvironmentAdapter};
use kuhhandel::rules::GameStateMachine;

fn random_episode(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_episode");
    for players in 3..=5 {
        group.bench_with_input(BenchmarkId::from_parameter(players), &players, |b, &players| {
            let config = EnvConfig::new(RulesConfig::default().with_players(players));
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                let mut env = EnvironmentAdapter::new(seed, config.clone()).unwrap();
                let mut agents = random_agents(players, seed);
                black_box(play_episode(&mut env, &mut agents, 100_000).unwrap())
            });
        });
    }
    group.finish();
}

fn state_clone(c: &mut Criterion) {
    let machine = GameStateMachine::new(RulesConfig::default()).unwrap();
    let state = machine.new_game(7).unwrap();
    c.bench_function("state_clone", |b| b.iter(|| black_box(state.clone())));
}

criterion_group!(benches, random_episode, state_clone);
criterion_main!(benches);
