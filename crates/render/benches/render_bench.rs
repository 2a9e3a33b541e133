use core_types::{Attributes, Document, Line, Op};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use render::{Reconciler, basic, export};

const SMALL_LINES: usize = 64;
const LARGE_LINES: usize = 5_000;

/// Paragraphs with marks, interleaved with five-item bullet lists.
fn make_document(lines: usize) -> Document {
    Document::new((0..lines).map(|i| {
        let id = format!("l{i}");
        if i % 10 >= 5 {
            Line::new(
                id.as_str(),
                Attributes::new().with("list", "bullet"),
                vec![Op::text(format!("item {i}"))],
            )
        } else {
            Line::new(
                id.as_str(),
                Attributes::new(),
                vec![
                    Op::text("plain  text, "),
                    Op::text("bold").with_attributes(Attributes::new().with("bold", true)),
                    Op::text(" and a ").with_attributes(Attributes::new().with("italic", true)),
                    Op::text("link").with_attributes(
                        Attributes::new().with("link", "https://example.com").with("bold", true),
                    ),
                ],
            )
        }
    }))
}

fn rendered(doc: &Document) -> Reconciler {
    let mut reconciler = Reconciler::new(basic::typeset());
    reconciler
        .render_full(doc)
        .expect("full render should succeed");
    reconciler
}

fn bench_full_render_small(c: &mut Criterion) {
    let doc = make_document(SMALL_LINES);
    c.bench_function("bench_full_render_small", |b| {
        b.iter(|| black_box(rendered(black_box(&doc))));
    });
}

fn bench_full_render_large(c: &mut Criterion) {
    let doc = make_document(LARGE_LINES);
    c.bench_function("bench_full_render_large", |b| {
        b.iter(|| black_box(rendered(black_box(&doc))));
    });
}

fn bench_incremental_edit_large(c: &mut Criterion) {
    let doc = make_document(LARGE_LINES);
    let line = Line::new("edited", Attributes::new(), vec![Op::text("x")]);
    let edited = doc.replace_line(LARGE_LINES / 2, line);
    c.bench_function("bench_incremental_edit_large", |b| {
        b.iter_batched(
            || rendered(&doc),
            |mut reconciler| {
                let report = reconciler
                    .render_incremental(&doc, black_box(&edited))
                    .expect("incremental render should succeed");
                black_box(report.patches.len());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_export_html_large(c: &mut Criterion) {
    let doc = make_document(LARGE_LINES);
    let typeset = basic::typeset();
    c.bench_function("bench_export_html_large", |b| {
        b.iter(|| {
            let html = export::to_html(&typeset, black_box(&doc), Default::default())
                .expect("export should succeed");
            black_box(html.len());
        });
    });
}

criterion_group!(
    benches,
    bench_full_render_small,
    bench_full_render_large,
    bench_incremental_edit_large,
    bench_export_html_large
);
criterion_main!(benches);
