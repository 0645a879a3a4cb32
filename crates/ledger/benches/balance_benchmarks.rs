use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use splitledger_core::{Currency, Money, Participant};
use splitledger_ledger::{Expense, SplitLedger, SplitRule, Transfer};

const PEOPLE: [&str; 5] = ["ana", "bob", "carl", "dee", "eve"];

fn participant(i: usize) -> Participant {
    Participant::new(PEOPLE[i % PEOPLE.len()]).expect("static participant names are valid")
}

/// Ledger with `n` shared expenses and a completed transfer every tenth record.
fn populated_ledger(n: usize) -> SplitLedger {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let mut ledger = SplitLedger::new(participant(0), Currency::USD);

    for i in 0..n {
        let total = Money::from_minor(1_000 + (i as i64 * 37) % 9_000, Currency::USD);
        let members = (0..3).map(|k| participant(i + k)).collect();
        let expense = Expense::new("Bench", "Misc", day, total, participant(i))
            .expect("valid expense")
            .shared(SplitRule::equal(members).expect("valid split"));
        ledger.record_expense(expense).expect("expense records");

        if i % 10 == 0 {
            let transfer = Transfer::completed(
                participant(i + 1),
                participant(i),
                Money::from_minor(500, Currency::USD),
                "Settle",
                day,
            )
            .expect("valid transfer");
            ledger.record_transfer(transfer).expect("transfer records");
        }
    }

    ledger
}

fn bench_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance_fold");

    for n in [100usize, 1_000, 10_000] {
        let ledger = populated_ledger(n);
        let bob = participant(1);
        group.throughput(Throughput::Elements(ledger.entries().len() as u64));

        group.bench_with_input(BenchmarkId::new("balance", n), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.balance(black_box(&bob))))
        });
        group.bench_with_input(BenchmarkId::new("balances", n), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.balances()))
        });
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let members: Vec<Participant> = (0..50)
        .map(|i| Participant::new(format!("user-{i}")).expect("valid participant"))
        .collect();
    let rule = SplitRule::equal(members).expect("valid split");
    let total = Money::from_minor(1_000_003, Currency::USD);

    c.bench_function("equal_split_50", |b| {
        b.iter(|| black_box(rule.shares(black_box(total))))
    });
}

criterion_group!(benches, bench_balance, bench_split);
criterion_main!(benches);
