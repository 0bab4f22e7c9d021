use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mkt_features::{FeatureCatalog, FeatureProfile, SignatureForm};

fn bench_signatures(c: &mut Criterion) {
    let catalog = FeatureCatalog::app();
    let values: Vec<bool> = (0..catalog.len()).map(|i| i % 3 == 0).collect();
    let profile = FeatureProfile::from_list(catalog, &values, None);

    let mut group = c.benchmark_group("signature");
    for form in [SignatureForm::Decimal, SignatureForm::Base64] {
        let text = profile.signature(form).to_string();

        group.bench_with_input(BenchmarkId::new("encode", form), &form, |b, &form| {
            b.iter(|| black_box(profile.signature(black_box(form)).to_string()));
        });

        group.bench_with_input(BenchmarkId::new("decode", form), &text, |b, text| {
            b.iter(|| {
                FeatureProfile::from_signature(catalog, black_box(text)).expect("valid signature")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_signatures);
criterion_main!(benches);
