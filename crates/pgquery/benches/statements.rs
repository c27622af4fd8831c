use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgquery::{Operator, Queries, SelectStatement, Statement, UpdateStatement};

/// A predicate set with `n` equality filters: col0 = $1 AND col1 = $2 ...
fn build_filters(n: usize) -> Queries {
    (0..n).fold(Queries::new(), |queries, i| {
        queries.add(&format!("col{i}"), [i as i64])
    })
}

fn bench_where_clause(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements/where_clause");

    for n in [1, 5, 10, 50, 100] {
        let queries = build_filters(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &queries, |b, queries| {
            b.iter(|| black_box(queries.where_clause()));
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements/select");

    for n in [1, 5, 10, 50, 100] {
        let names: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
        let columns: Vec<&str> = names.iter().map(String::as_str).collect();
        let queries = build_filters(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &queries, |b, queries| {
            b.iter(|| black_box(SelectStatement::default().build("t", &columns, queries)));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let queries = Queries::new().add_with("id", Operator::In, values.iter().copied());
                black_box(queries.where_clause());
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements/update");

    for n in [1, 10, 50] {
        let queries = (0..n).fold(build_filters(1), |queries, i| {
            queries.set(&format!("col{i}"), i as i64)
        });
        group.bench_with_input(BenchmarkId::from_parameter(n), &queries, |b, queries| {
            b.iter(|| black_box(UpdateStatement::default().build("t", &[], queries)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_where_clause,
    bench_select,
    bench_in_list,
    bench_update
);
criterion_main!(benches);
