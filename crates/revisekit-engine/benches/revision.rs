use criterion::{Criterion, criterion_group, criterion_main};
use revisekit_engine::{Issue, IssueKind, KindFilter, RevisionEngine, Span};

/// Text of `count` repeated sentences with one flagged word in each
fn generate_fixture(count: usize) -> (String, Vec<Issue>) {
    let sentence = "这款减肥产品效果很好。";
    let sentence_len = sentence.chars().count();
    let text = sentence.repeat(count);
    let issues = (0..count)
        .map(|i| {
            let start = i * sentence_len + 2;
            Issue::new(
                format!("issue-{i}"),
                IssueKind::HomophoneWord,
                Span::new(start, start + 2),
            )
            .with_suggestions(["jian肥"])
        })
        .collect();
    (text, issues)
}

fn bench_batch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("revision");
    group.sample_size(10);

    let (text, issues) = generate_fixture(500);
    let mut loaded = RevisionEngine::new();
    loaded
        .load_analysis(&text, issues, 50)
        .expect("fixture spans fit the text");

    group.bench_function("apply_batch_500", |b| {
        b.iter(|| {
            let mut engine = loaded.clone();
            let report = engine.apply_batch(std::hint::black_box(&KindFilter::Any));
            std::hint::black_box(report)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_batch_apply);
criterion_main!(benches);
