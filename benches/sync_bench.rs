use std::rc::Rc;

use chart_data_sync::api::{ChartDataEvent, ChartDataModel, ChartSyncConfig, FnListener};
use chart_data_sync::core::{ColumnReplacements, ColumnRouter, Figure, assign_colorway};
use chart_data_sync::source::{
    ColumnDescriptor, ColumnReplacementMap, ColumnType, MemoryTable, RawCell, RowPatch,
    TableDelta, TableEvent, TableHandle,
};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

fn scatter_figure(traces: usize) -> Figure {
    let data = (0..traces)
        .map(|i| {
            json!({
                "type": if i % 3 == 0 { "bar" } else { "scatter" },
                "x": [],
                "y": [],
                "marker": { "color": "#1f77b4" },
                "line": { "color": "#ff7f0e" }
            })
        })
        .collect::<Vec<_>>();
    Figure::from_value(json!({
        "data": data,
        "layout": { "template": { "layout": { "colorway": ["#1f77b4", "#ff7f0e", "#2ca02c"] } } }
    }))
    .expect("valid figure")
}

fn bench_colorway_1k_traces(c: &mut Criterion) {
    let figure = scatter_figure(1_000);
    let theme = vec!["#111".to_owned(), "#222".to_owned(), "#333".to_owned()];
    let original = vec![
        "#1f77b4".to_owned(),
        "#ff7f0e".to_owned(),
        "#2ca02c".to_owned(),
    ];

    c.bench_function("colorway_1k_traces", |b| {
        b.iter(|| {
            let mut traces = figure.data().to_vec();
            let _ = assign_colorway(black_box(&mut traces), &theme, &original);
        })
    });
}

fn bench_route_scalar(c: &mut Criterion) {
    let router = ColumnRouter::default();
    let mut figure = scatter_figure(16);

    c.bench_function("route_scalar", |b| {
        b.iter(|| {
            router
                .route("/plotly/data/15/marker/color", json!("#abc"), &mut figure)
                .expect("route");
        })
    });
}

fn bench_append_rows_through_model(c: &mut Criterion) {
    let table = Rc::new(MemoryTable::new(
        "ticks",
        vec![
            ColumnDescriptor::new("time", ColumnType::Int),
            ColumnDescriptor::new("price", ColumnType::Double),
        ],
    ));
    let handle = TableHandle::new(table.clone());
    let replacements = ColumnReplacements::new()
        .with_destination("time", "/plotly/data/0/x")
        .with_destination("price", "/plotly/data/0/y");
    let model = ChartDataModel::new(
        vec![handle.clone()],
        ColumnReplacementMap::new().with_table(handle, replacements),
        scatter_figure(4),
        ChartSyncConfig::new(),
    )
    .expect("valid model");
    model
        .subscribe(Box::new(FnListener::new(
            "bench",
            |_: &ChartDataEvent, _: &Figure| {},
        )))
        .expect("subscribe");

    let seed = TableDelta::new()
        .set("time", RawCell::column((0..10_000_i64).collect::<Vec<_>>()))
        .set(
            "price",
            RawCell::column((0..10_000).map(|i| 100.0 + f64::from(i) * 0.01)),
        );
    table.emit(&TableEvent::Updated(seed));

    let tick = TableEvent::Updated(
        TableDelta::new()
            .rows("time", RowPatch::default().with_modified(9_999, 10_000_i64))
            .rows("price", RowPatch::default().with_modified(9_999, 101.5)),
    );
    c.bench_function("model_row_patch_10k", |b| {
        b.iter(|| {
            let _ = table.emit(black_box(&tick));
        })
    });
}

criterion_group!(
    benches,
    bench_colorway_1k_traces,
    bench_route_scalar,
    bench_append_rows_through_model
);
criterion_main!(benches);
