//! Criterion benchmarks for planning and graph ordering.
//!
//! Run with:
//! ```bash
//! cargo bench -p weft-core
//! ```

use std::hint::black_box;
use std::sync::{Arc, LazyLock};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use weft_core::capability::{Capabilities, Source, UpdateSet};
use weft_core::node::NodeBase;
use weft_core::{Digraph, IdAllocator, InterestSet, OutputId, Planner, UpdateId};

static OUTPUTS: LazyLock<Capabilities> = LazyLock::new(|| {
    Capabilities::builder("Layer")
        .names(["Value", "Jacobian"])
        .build()
        .unwrap()
});

static UPDATES: LazyLock<UpdateSet> = LazyLock::new(|| {
    UpdateSet::builder("Layer")
        .names(["UpdateValue", "UpdateJacobian"])
        .build()
        .unwrap()
});

const VALUE: OutputId = OutputId::new(0);
const JACOBIAN: OutputId = OutputId::new(1);
const UPDATE_VALUE: UpdateId = UpdateId::new(0);
const UPDATE_JACOBIAN: UpdateId = UpdateId::new(1);

struct Layer {
    base: NodeBase<Layer>,
}

weft_core::impl_node!(Layer, base);

// ── helpers ─────────────────────────────────────────────────────────────────

/// `width` nodes per level, each reading every node of the level below.
fn web(levels: usize, width: usize) -> Vec<Arc<dyn Source>> {
    let ids = IdAllocator::new();
    let mut below: Vec<Arc<dyn Source>> = Vec::new();
    for _ in 0..levels {
        let mut level = Vec::with_capacity(width);
        for _ in 0..width {
            let mut base = NodeBase::new(ids.next_id(), &OUTPUTS, &UPDATES);
            base.register_update(UPDATE_VALUE, |l: &Layer| {
                black_box(l.base.source_id());
            })
            .unwrap();
            base.register_update(UPDATE_JACOBIAN, |_: &Layer| {}).unwrap();
            base.add_output_dependency(VALUE, UPDATE_VALUE).unwrap();
            base.add_output_dependency(JACOBIAN, UPDATE_JACOBIAN).unwrap();
            base.add_internal_dependency(UPDATE_JACOBIAN, UPDATE_VALUE)
                .unwrap();
            for input in &below {
                base.add_input_dependency(UPDATE_VALUE, Arc::clone(input), VALUE)
                    .unwrap();
            }
            level.push(Arc::new(Layer { base }) as Arc<dyn Source>);
        }
        below = level;
    }
    below
}

fn planner_for(top: &[Arc<dyn Source>]) -> Planner {
    let mut interest = InterestSet::new();
    for node in top {
        interest.add(Arc::clone(node), JACOBIAN).unwrap();
    }
    let mut planner = Planner::new();
    planner.add(interest);
    planner
}

// ── planning ────────────────────────────────────────────────────────────────

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner/update");

    for &levels in &[4usize, 16, 64] {
        let mut planner = planner_for(&web(levels, 8));
        group.bench_with_input(BenchmarkId::new("levels", levels), &levels, |b, _| {
            b.iter(|| planner.update().unwrap());
        });
    }

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut planner = planner_for(&web(32, 8));
    planner.update().unwrap();

    c.bench_function("planner/execute", |b| b.iter(|| planner.execute().unwrap()));
}

// ── graph ───────────────────────────────────────────────────────────────────

fn bench_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/order");

    for &n in &[1_000usize, 10_000, 100_000] {
        let edges: Vec<(usize, usize)> = (1..n).map(|i| (i, i / 2)).collect();
        let graph = Digraph::from_edges(n, &edges).unwrap();
        group.bench_with_input(BenchmarkId::new("tree", n), &graph, |b, graph| {
            b.iter(|| black_box(graph.order().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_execute, bench_order);
criterion_main!(benches);
