// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flowspec::format::flow::{
    collect_type_declarations, extract_flow_code, parse_flow_source, sort_type_declarations,
};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `format.parse_flow`, `format.collect_types`,
//   `format.extract_flow`, `format.sort_types`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (`small`, `medium`, `large_many_types`).
fn benches_parse(c: &mut Criterion) {
    let cases = [
        fixtures::Case::Small,
        fixtures::Case::Medium,
        fixtures::Case::LargeManyTypes,
    ];

    {
        let mut group = c.benchmark_group("format.parse_flow");
        for case in cases {
            let source = fixtures::flow_source(case);
            group.throughput(Throughput::Bytes(source.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let model = parse_flow_source(black_box(&source)).expect("parse_flow_source");
                    black_box(fixtures::checksum_model(black_box(&model)))
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("format.collect_types");
        for case in cases {
            let source = fixtures::flow_source(case);
            let lines: Vec<&str> = source.lines().collect();
            group.throughput(Throughput::Elements(lines.len() as u64));
            group.bench_function(case.id(), |b| {
                b.iter(|| black_box(collect_type_declarations(black_box(&lines)).len()))
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("format.extract_flow");
        for case in cases {
            let source = fixtures::flow_source(case);
            let lines: Vec<&str> = source.lines().collect();
            group.throughput(Throughput::Elements(lines.len() as u64));
            group.bench_function(case.id(), |b| {
                b.iter(|| black_box(extract_flow_code(black_box(&lines)).len()))
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("format.sort_types");
        for case in cases {
            let source = fixtures::flow_source(case);
            group.throughput(Throughput::Bytes(source.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let sorted =
                        sort_type_declarations(black_box(&source)).expect("sort_type_declarations");
                    black_box(sorted.len())
                })
            });
        }
        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_parse
}
criterion_main!(benches);
