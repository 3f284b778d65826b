use abidiff_editscript::diff;
use criterion::{criterion_group, criterion_main, Criterion};

fn sequence(len: usize) -> Vec<i32> {
    (0..len as i32).collect()
}

fn localized_change(len: usize, at: usize) -> Vec<i32> {
    let mut v = sequence(len);
    v.insert(at, -1);
    v
}

fn bench_identical(c: &mut Criterion) {
    let a = sequence(2048);
    let b = a.clone();
    c.bench_function("diff_identical_2048", |b_| {
        b_.iter(|| diff(&a, &b));
    });
}

fn bench_localized_change(c: &mut Criterion) {
    let a = sequence(2048);
    let b = localized_change(2048, 1024);
    c.bench_function("diff_localized_insert_2048", |b_| {
        b_.iter(|| diff(&a, &b));
    });
}

fn bench_fully_distinct(c: &mut Criterion) {
    let a: Vec<i32> = (0..256).collect();
    let b: Vec<i32> = (256..512).collect();
    c.bench_function("diff_fully_distinct_256", |b_| {
        b_.iter(|| diff(&a, &b));
    });
}

criterion_group!(benches, bench_identical, bench_localized_change, bench_fully_distinct);
criterion_main!(benches);
