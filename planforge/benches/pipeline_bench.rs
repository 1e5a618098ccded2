//! Benchmarks for pass-time costs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use planforge::agents::ResearchProposal;
use planforge::context::Horizon;
use planforge::policy::SpawnPolicy;
use planforge::scheduler::{ResearchTier, Task, TaskRequest, TaskTable};

fn pipeline_benchmark(c: &mut Criterion) {
    let policy = SpawnPolicy::default();
    let proposal = ResearchProposal::new(
        "item-1",
        "University Research Plan",
        "shortlist programs and their requirements",
        Horizon::Tactical,
    );

    c.bench_function("spawn_decision", |b| {
        b.iter(|| black_box(policy.should_spawn(black_box(&proposal))))
    });

    let table = TaskTable::new();
    let request = TaskRequest::new(
        "item-1",
        "shortlist programs and their requirements",
        ResearchTier::Base,
        Horizon::Tactical,
    );
    table.register(Task::new(request.clone()));

    c.bench_function("dedup_register", |b| {
        b.iter(|| black_box(table.register(Task::new(black_box(request.clone())))))
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
