use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uml_class_renderer::config::{Config, LayoutConfig, LayoutEngineKind};
use uml_class_renderer::diagram::build_diagram;
use uml_class_renderer::ir::{ClassModel, ClassRecord, Method, RelationshipKind, RelationshipRecord};
use uml_class_renderer::layout::{compute_layout, layout_engine};
use uml_class_renderer::merge::merge_relationships;
use uml_class_renderer::render::render_svg;
use uml_class_renderer::render_class_diagram;
use uml_class_renderer::theme::Theme;

fn dense_class_model(classes: usize, extra_edges: usize) -> ClassModel {
    let mut model = ClassModel::new();
    for i in 0..classes {
        let mut class = ClassRecord::new(format!("Class{i}"));
        class.fields.private.push(format!("int value{i}"));
        if i % 3 != 0 {
            class.methods.public.push(Method::new(format!("void step{i}()")));
        }
        if i % 5 == 0 {
            class.methods.public.push(Method::pure_virtual("double area()"));
        }
        model.classes.push(class);
    }
    for i in 0..classes.saturating_sub(1) {
        let kind = RelationshipKind::ALL[i % RelationshipKind::ALL.len()];
        model.relationships.push(RelationshipRecord::new(
            format!("Class{i}"),
            format!("Class{}", i + 1),
            kind,
        ));
    }
    let mut count = 0usize;
    'outer: for i in 0..classes {
        for j in (i + 2)..classes {
            if count >= extra_edges {
                break 'outer;
            }
            model.relationships.push(RelationshipRecord::new(
                format!("Class{j}"),
                format!("Class{i}"),
                RelationshipKind::Association,
            ));
            count += 1;
        }
    }
    model
}

const SIZES: [(&str, usize, usize); 3] = [("tiny", 4, 2), ("medium", 40, 40), ("large", 150, 200)];

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for (name, classes, extra) in SIZES {
        let model = dense_class_model(classes, extra);
        group.bench_with_input(BenchmarkId::from_parameter(name), &model, |b, data| {
            b.iter(|| black_box(merge_relationships(black_box(&data.relationships)).len()));
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for engine in [LayoutEngineKind::Dagre, LayoutEngineKind::Layered] {
        let config = LayoutConfig {
            engine,
            ..LayoutConfig::default()
        };
        for (name, classes, extra) in SIZES {
            let diagram = build_diagram(&dense_class_model(classes, extra), &config, &Theme::classic());
            let id = format!("{engine:?}/{name}");
            group.bench_with_input(BenchmarkId::from_parameter(id), &diagram, |b, data| {
                let layout = layout_engine(&config);
                b.iter(|| {
                    let geometry = compute_layout(black_box(data), &config, layout.as_ref());
                    black_box(geometry.nodes.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = Config {
        layout: LayoutConfig {
            engine: LayoutEngineKind::Layered,
            ..LayoutConfig::default()
        },
        ..Config::default()
    };
    for (name, classes, extra) in SIZES {
        let diagram = build_diagram(&dense_class_model(classes, extra), &config.layout, &config.theme);
        let geometry = compute_layout(&diagram, &config.layout, layout_engine(&config.layout).as_ref());
        group.bench_with_input(BenchmarkId::from_parameter(name), &geometry, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                let report = render_svg(&diagram, black_box(data), &config.theme, &config.render, &mut out)
                    .expect("render failed");
                black_box((report.edges_drawn, out.len()));
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = Config::default();
    for (name, classes, extra) in SIZES {
        let model = dense_class_model(classes, extra);
        group.bench_with_input(BenchmarkId::from_parameter(name), &model, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                render_class_diagram(black_box(data), &config, &mut out).expect("render failed");
                black_box(out.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_merge, bench_layout, bench_render, bench_end_to_end
);
criterion_main!(benches);
