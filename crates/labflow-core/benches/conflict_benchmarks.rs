use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use labflow_core::find_conflict;
use labflow_schema::{Slot, TimeOfDay};
use labflow_store::SlotReservation;

fn reservations(count: usize) -> Vec<SlotReservation> {
    (0..count)
        .map(|i| SlotReservation {
            id: format!("res-{i}").into(),
            lab_id: "lab-1".into(),
            lab_name: "Systems Lab".to_owned(),
            date: chrono::NaiveDate::from_num_days_from_ce_opt(739_000 + i as i32)
                .expect("valid date"),
            time: TimeOfDay::Forenoon,
            request_id: format!("req-{i}").into(),
            created_at: "2024-04-01T08:00:00Z".to_owned(),
        })
        .collect()
}

fn candidates_clear(count: usize) -> Vec<Slot> {
    // Dates far past every reservation, so the scan runs to completion
    (0..count)
        .map(|i| {
            Slot::new(
                chrono::NaiveDate::from_num_days_from_ce_opt(750_000 + i as i32)
                    .expect("valid date"),
                TimeOfDay::Afternoon,
            )
        })
        .collect()
}

fn bench_conflict_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_conflict");
    for ledger_size in [100usize, 1_000, 10_000] {
        let existing = reservations(ledger_size);
        let clear = candidates_clear(10);
        group.bench_with_input(
            BenchmarkId::new("no_conflict_full_scan", ledger_size),
            &ledger_size,
            |b, _| b.iter(|| find_conflict(std::hint::black_box(&existing), &clear)),
        );

        // Worst case for a hit: the colliding candidate is last
        let mut late_hit = candidates_clear(9);
        late_hit.push(existing[ledger_size - 1].slot());
        group.bench_with_input(
            BenchmarkId::new("late_hit", ledger_size),
            &ledger_size,
            |b, _| b.iter(|| find_conflict(std::hint::black_box(&existing), &late_hit)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_conflict_scan);
criterion_main!(benches);
