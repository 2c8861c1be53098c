//! Criterion benchmarks for fcflab hot paths.
//!
//! Benchmarks:
//! 1. Price alignment (binary search per report date over daily series)
//! 2. Grouped trailing growth over many tickers

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fcflab_core::domain::{FundamentalRecord, FundamentalRow, GrowthWindow, PriceBook, PriceRecord};
use fcflab_core::growth::apply_grouped_growth;
use fcflab_core::{align_prices, finalize, DEFAULT_WINDOW_DAYS};

// ── Helpers ──────────────────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap()
}

fn make_fundamentals(tickers: usize, quarters: usize) -> Vec<FundamentalRow> {
    let mut rows = Vec::with_capacity(tickers * quarters);
    for t in 0..tickers {
        for q in 0..quarters {
            rows.push(FundamentalRow::new(FundamentalRecord {
                ticker: format!("T{t:04}"),
                report_date: base_date() + Duration::days(91 * q as i64),
                operating_cash_flow: Some(100.0 + (q as f64 * 0.3).sin() * 20.0),
                capital_expenditure: Some(-15.0),
                shares_basic: Some(1_000.0),
                revenue: None,
                net_income: None,
            }));
        }
    }
    rows
}

fn make_prices(tickers: usize, days: usize) -> PriceBook {
    let mut records = Vec::with_capacity(tickers * days);
    for t in 0..tickers {
        for i in 0..days {
            // Skip weekends so some report dates need the forward window.
            if i % 7 >= 5 {
                continue;
            }
            records.push(PriceRecord {
                ticker: format!("T{t:04}"),
                trade_date: base_date() + Duration::days(i as i64),
                price: 50.0 + (i as f64 * 0.05).cos() * 5.0,
            });
        }
    }
    PriceBook::from_records(records)
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_prices");
    for &tickers in &[10usize, 100] {
        let prices = make_prices(tickers, 365 * 20);
        let rows = make_fundamentals(tickers, 80);
        group.bench_with_input(BenchmarkId::from_parameter(tickers), &tickers, |b, _| {
            b.iter(|| {
                let out = align_prices(black_box(rows.clone()), &prices, DEFAULT_WINDOW_DAYS);
                black_box(out.aligned.len())
            })
        });
    }
    group.finish();
}

fn bench_growth(c: &mut Criterion) {
    let windows = [
        GrowthWindow::SIX_MONTHS,
        GrowthWindow::ONE_YEAR,
        GrowthWindow::TWO_YEARS,
        GrowthWindow::THREE_YEARS,
    ];
    let rows = make_fundamentals(500, 80);
    c.bench_function("fcf_ps_growth_500x80", |b| {
        b.iter(|| {
            let mut rows = rows.clone();
            apply_grouped_growth(
                &mut rows,
                &windows,
                |r| r.ticker(),
                |r| r.fcf_per_share,
                |r| &mut r.fcf_ps_growth,
            );
            black_box(rows.len())
        })
    });

    let prices = make_prices(500, 365 * 20);
    let aligned = align_prices(rows, &prices, DEFAULT_WINDOW_DAYS).aligned;
    c.bench_function("finalize_500x80", |b| {
        b.iter(|| black_box(finalize(aligned.clone(), &windows).len()))
    });
}

criterion_group!(benches, bench_alignment, bench_growth);
criterion_main!(benches);
