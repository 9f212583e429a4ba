use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use raffle::allocation::{filter_eligible, select, RaffleUnits};
use raffle::operations::{PlanExecutor, RaffleOptions, RafflePlan};
use raffle::service::RecordingService;
use raffle::{
    CliqueId, EventSlug, EventSnapshot, Order, OrderCode, OrderPosition, OverrideMode, SubEventId,
    UserId,
};

const POOL_SIZES: &[usize] = &[100, 1_000, 10_000];

/// A pool where every fourth order shares a clique with its neighbour and
/// every fiftieth is forced in.
fn build_snapshot(count: usize) -> EventSnapshot {
    let event = EventSlug::new("bench").expect("valid slug");
    let subevent = Some(SubEventId::new(1));
    let mut snapshot = EventSnapshot::new(event.clone());

    for i in 0..count {
        let code = OrderCode::new(format!("O{i:05}")).expect("valid code");
        let tickets = 1 + i % 3;
        let order = Order::builder(event.clone(), code.clone())
            .require_approval(true)
            .positions(vec![OrderPosition::admission(subevent); tickets])
            .build()
            .expect("valid order");
        snapshot = snapshot.with_order(order);

        if i % 4 < 2 {
            let clique = i64::try_from(i / 4).expect("fits in i64");
            snapshot = snapshot.with_membership(code.clone(), CliqueId::new(clique));
        }
        if i % 50 == 0 {
            snapshot = snapshot.with_override(code, OverrideMode::Always);
        }
    }
    snapshot
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for &size in POOL_SIZES {
        let snapshot = build_snapshot(size);
        let units = RaffleUnits::resolve(
            filter_eligible(snapshot.orders(), Some(SubEventId::new(1))),
            &snapshot,
        );
        let quota = i64::try_from(size).expect("fits in i64");

        group.bench_with_input(BenchmarkId::from_parameter(size), &units, |b, units| {
            b.iter_batched(
                || StdRng::seed_from_u64(42),
                |mut rng| black_box(select(units, quota, &mut rng)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_plan_and_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_and_execute");

    for &size in POOL_SIZES {
        let snapshot = build_snapshot(size);
        let quota = i64::try_from(size / 2).expect("fits in i64");

        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let options = RaffleOptions::new(UserId::new(1), quota)
                    .with_subevent(Some(SubEventId::new(1)))
                    .with_seed(Some(7));
                let plan = RafflePlan::new(options).build_plan(snapshot);
                let service = RecordingService::new();
                let result = PlanExecutor::new(&service, &service)
                    .execute(&plan)
                    .expect("recording service never fails");
                black_box(result)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_plan_and_execute);
criterion_main!(benches);
