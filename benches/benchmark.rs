//! Benchmarks for xbase performance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::Path;
use tempfile::TempDir;
use xbase::{DbfDate, Field, IfNonExistent, Record, Table, Version};

fn fields() -> Vec<Field> {
    vec![
        Field::character("NAME", 20),
        Field::number("AMOUNT", 12, 2),
        Field::logical("PAID"),
        Field::date("DUE"),
    ]
}

fn row(i: usize) -> Record {
    Record::new()
        .with("NAME", format!("customer {:06}", i))
        .with("AMOUNT", i as f64 * 0.75)
        .with("PAID", i % 2 == 0)
        .with("DUE", DbfDate::new(2020, 1 + (i % 12) as u8, 1 + (i % 28) as u8))
}

fn populated(path: &Path, version: Version, fields: Vec<Field>, size: usize, memo: bool) -> Table {
    let mut table = Table::create(path, version, fields);
    table.open(IfNonExistent::Create).unwrap();
    for i in 0..size {
        let mut record = row(i);
        if memo {
            record.set("NOTES", "lorem ipsum ".repeat(i % 100));
        }
        table.add_record(&record).unwrap();
    }
    table
}

/// Benchmark appending records.
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || {
                    let dir = TempDir::new().unwrap();
                    let mut table = Table::create(dir.path().join("t.dbf"), Version::DBase3, fields());
                    table.open(IfNonExistent::Create).unwrap();
                    (dir, table)
                },
                |(_dir, mut table)| {
                    for i in 0..size {
                        table.add_record(&row(i)).unwrap();
                    }
                    black_box(table.close().unwrap())
                },
            );
        });
    }

    group.finish();
}

/// Benchmark a full scan with typed access to every field.
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [100, 1000, 10000].iter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.dbf");
        populated(&path, Version::DBase3, fields(), *size, false)
            .close()
            .unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut table = Table::new(&path);
                table.open(IfNonExistent::Error).unwrap();
                for record in table.records().unwrap() {
                    let record = record.unwrap();
                    black_box(record.string_value("NAME").unwrap());
                    black_box(record.number_value("AMOUNT").unwrap());
                    black_box(record.bool_value("PAID").unwrap());
                    black_box(record.date_value("DUE").unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark copying records without decoding them.
fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy");
    let size = 5000;

    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.dbf");
    populated(&source, Version::DBase3, fields(), size, false)
        .close()
        .unwrap();

    group.throughput(Throughput::Elements(size as u64));
    group.bench_function("5000_records", |b| {
        b.iter_with_setup(
            || {
                let target = TempDir::new().unwrap();
                let mut copy = Table::create(target.path().join("copy.dbf"), Version::DBase3, fields());
                copy.open(IfNonExistent::Create).unwrap();
                (target, copy)
            },
            |(_target, mut copy)| {
                let mut table = Table::new(&source);
                table.open(IfNonExistent::Error).unwrap();
                for record in table.records().unwrap() {
                    copy.add_record(&record.unwrap()).unwrap();
                }
                black_box(copy.close().unwrap())
            },
        );
    });

    group.finish();
}

/// Benchmark reading memo fields for each memo layout.
fn bench_memo(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo_scan");
    let size = 1000;

    for version in [Version::DBase3, Version::DBase4, Version::FoxPro26] {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.dbf");
        let mut with_memo = fields();
        with_memo.push(Field::memo("NOTES"));
        populated(&path, version, with_memo, size, true)
            .close()
            .unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(version), &version, |b, _| {
            b.iter(|| {
                let mut table = Table::new(&path);
                table.open(IfNonExistent::Error).unwrap();
                for record in table.records().unwrap() {
                    black_box(record.unwrap().string_value("NOTES").unwrap().map(str::len));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_scan, bench_copy, bench_memo);

criterion_main!(benches);
