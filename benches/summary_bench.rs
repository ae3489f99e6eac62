use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::tempdir;
use time::{Date, Month};
use tokio::runtime::Runtime;

use fintracker_server::database::{Db, init_db};
use fintracker_server::expenses::insert_expense;
use fintracker_server::incomes::insert_income;
use fintracker_server::models::{CreateIncomePayload, Expense, ExpensePayload, Income, User};
use fintracker_server::summary::{Snapshot, monthly_summary, summarize};
use fintracker_server::users::insert_user;

// Benchmark constants
const BENCH_MONTH: u32 = 9;
const BENCH_YEAR: i32 = 2025;
const BENCH_USER_COUNT: i64 = 8;
const BENCH_RECORD_COUNT: usize = 1000;

fn bench_date(index: usize) -> Date {
    let day = (index % 30) as u8 + 1;
    Date::from_calendar_date(BENCH_YEAR, Month::September, day).unwrap()
}

fn in_memory_snapshot() -> Snapshot {
    let users = (1..=BENCH_USER_COUNT)
        .map(|id| User {
            id,
            name: format!("user_{}", id),
        })
        .collect();

    let incomes = (0..BENCH_RECORD_COUNT / 10)
        .map(|i| Income {
            id: i as i64,
            amount: 1000.0 + (i % 7) as f64 * 250.0,
            date: bench_date(i),
            user_id: (i as i64 % BENCH_USER_COUNT) + 1,
        })
        .collect();

    let expenses = (0..BENCH_RECORD_COUNT)
        .map(|i| Expense {
            id: i as i64,
            amount: 10.0 + (i % 100) as f64,
            category: format!("category_{}", i % 10),
            date: bench_date(i),
            is_common: i % 3 == 0,
            user_id: (i as i64 % BENCH_USER_COUNT) + 1,
        })
        .collect();

    Snapshot {
        users,
        incomes,
        expenses,
    }
}

async fn populate_database(db: &Db) {
    let mut user_ids = Vec::new();
    for id in 1..=BENCH_USER_COUNT {
        let user = insert_user(db, &format!("user_{}", id)).await.unwrap();
        user_ids.push(user.id);
    }

    for i in 0..BENCH_RECORD_COUNT / 10 {
        let payload = CreateIncomePayload {
            amount: 1000.0 + (i % 7) as f64 * 250.0,
            user_id: user_ids[i % user_ids.len()],
            date: bench_date(i),
        };
        insert_income(db, &payload).await.unwrap();
    }

    for i in 0..BENCH_RECORD_COUNT {
        let payload = ExpensePayload {
            amount: 10.0 + (i % 100) as f64,
            category: format!("category_{}", i % 10),
            user_id: user_ids[i % user_ids.len()],
            date: bench_date(i),
            is_common: i % 3 == 0,
        };
        insert_expense(db, &payload).await.unwrap();
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let snapshot = in_memory_snapshot();

    c.bench_function("summarize_in_memory", |b| {
        b.iter(|| summarize(BENCH_MONTH, BENCH_YEAR, black_box(&snapshot)).unwrap())
    });

    let rt = Runtime::new().unwrap();
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir.path().to_str().unwrap().to_string();

    // Setup benchmark data once
    let db = rt.block_on(init_db(&data_path)).unwrap();
    rt.block_on(populate_database(&db));

    c.bench_function("monthly_summary_from_db", |b| {
        b.to_async(&rt).iter(|| async {
            let report = monthly_summary(&db, BENCH_MONTH, BENCH_YEAR).await.unwrap();
            black_box(report);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
