// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flowspec::query::{build_query_gwt_mapping, client_spec_paths, DEFAULT_SPEC_SEPARATOR};
use flowspec::schema::{export_schema_json, parse_schema_json};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `schema.export`, `schema.import`, `query.flatten_specs`,
//   `query.gwt_mapping`
// - Case IDs: `small`, `medium`, `large_many_types`.
fn benches_schema(c: &mut Criterion) {
    let cases = [
        fixtures::Case::Small,
        fixtures::Case::Medium,
        fixtures::Case::LargeManyTypes,
    ];

    {
        let mut group = c.benchmark_group("schema.export");
        for case in cases {
            let model = fixtures::flow_model(case);
            group.throughput(Throughput::Elements(model.narratives().len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let text = export_schema_json(black_box(&model), DEFAULT_SPEC_SEPARATOR)
                        .expect("export_schema_json");
                    black_box(text.len())
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("schema.import");
        for case in cases {
            let model = fixtures::flow_model(case);
            let text =
                export_schema_json(&model, DEFAULT_SPEC_SEPARATOR).expect("export_schema_json");
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let parsed = parse_schema_json(black_box(&text)).expect("parse_schema_json");
                    black_box(fixtures::checksum_model(black_box(&parsed)))
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("query.flatten_specs");
        for case in cases {
            let model = fixtures::flow_model(case);
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let paths = client_spec_paths(black_box(&model), DEFAULT_SPEC_SEPARATOR);
                    let total: usize = paths.iter().map(|(_, paths)| paths.len()).sum();
                    black_box(total)
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("query.gwt_mapping");
        for case in cases {
            let model = fixtures::flow_model(case);
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let total: usize = black_box(&model)
                        .narratives()
                        .iter()
                        .flat_map(|narrative| narrative.slices())
                        .map(|slice| build_query_gwt_mapping(slice).len())
                        .sum();
                    black_box(total)
                })
            });
        }
        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_schema
}
criterion_main!(benches);
