//! Benchmarks for reading and classifying engine output.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use metta_infer::classify::Classifier;
use metta_infer::resolver::{DescriptionTemplates, EntityResolver};
use metta_infer::sexpr::parse_all;

const TRANSCRIPT: &str = "\
[(triple soa_emam type rexist), (triple soa_emam type soaMoor), (triple soa_emam soaHas_agent soa_ALEXANDRA_MAERSK)]
[((meta-id soa_enmam type rexist true) (id_not_not_false soa_enmam))]
[(conflict not_opt soa_elam), (conflict (mod-not-id soa_elam permitted) soa_elam)]
[(quote ((inrs-prohibited-id soa_ALEXANDRA_MAERSK) (inrs-only-id (pay-obligatory-id soa_epam soa_sptMICT))))]
[(soa_enpam soa_epam15k)]
";

fn transcript(repeat: usize) -> String {
    TRANSCRIPT.repeat(repeat)
}

fn bench_parse(c: &mut Criterion) {
    let input = transcript(100);
    c.bench_function("parse_500_lines", |bench| {
        bench.iter(|| black_box(parse_all(black_box(&input)).unwrap()))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let resolver = EntityResolver::new();
    let templates = DescriptionTemplates::new();
    let classifier = Classifier::new(&resolver, &templates);
    let input = transcript(100);

    c.bench_function("analyze_500_lines", |bench| {
        bench.iter(|| black_box(classifier.analyze(black_box(&input))))
    });
}

fn bench_metrics(c: &mut Criterion) {
    let resolver = EntityResolver::new();
    let templates = DescriptionTemplates::new();
    let classifier = Classifier::new(&resolver, &templates);

    c.bench_function("metrics_single_transcript", |bench| {
        bench.iter(|| black_box(classifier.metrics(black_box(TRANSCRIPT))))
    });
}

fn bench_batch(c: &mut Criterion) {
    let resolver = EntityResolver::new();
    let templates = DescriptionTemplates::new();
    let classifier = Classifier::new(&resolver, &templates);
    let inputs: Vec<String> = (0..64).map(|_| transcript(4)).collect();
    let refs: Vec<&str> = inputs.iter().map(String::as_str).collect();

    c.bench_function("analyze_batch_64", |bench| {
        bench.iter(|| black_box(classifier.analyze_batch(&refs)))
    });
}

criterion_group!(benches, bench_parse, bench_analyze, bench_metrics, bench_batch);
criterion_main!(benches);
