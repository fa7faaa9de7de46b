use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rust_data_cleansing::expr::SeriesExpression;
use rust_data_cleansing::frame::DataFrame;

const ROWS: usize = 10_000;

fn frame() -> DataFrame {
    let cells = |f: fn(usize) -> String| (0..ROWS).map(f).collect::<Vec<_>>();
    DataFrame::from_text_columns(vec![
        ("id".to_string(), cells(|i| (i % 997).to_string())),
        (
            "price".to_string(),
            cells(|i| if i % 10 == 0 { String::new() } else { format!("{}.5", i % 113) }),
        ),
        ("qty".to_string(), cells(|i| (i % 7).to_string())),
    ])
    .expect("benchmark frame")
}

fn bench_median(c: &mut Criterion) {
    let df = frame();
    let qty = df.column("qty").expect("qty column");
    c.bench_function("series_median_10k", |b| {
        b.iter(|| black_box(qty.median().expect("median")))
    });
}

fn bench_drop_duplicates(c: &mut Criterion) {
    let df = frame();
    c.bench_function("frame_drop_duplicates_10k", |b| {
        b.iter(|| black_box(df.drop_duplicates()))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let df = frame();
    c.bench_function("expression_evaluate_10k", |b| {
        b.iter(|| {
            let expr = SeriesExpression::parse("( price * qty + id ) / 2", &df).expect("parse");
            black_box(expr.evaluate().expect("evaluate"))
        })
    });
}

criterion_group!(benches, bench_median, bench_drop_duplicates, bench_evaluate);
criterion_main!(benches);
