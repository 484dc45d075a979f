use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tempestade_crypto::{derive_key, KdfParams, Salt, SecretVault};
use tempestade_storage::MemoryStore;

fn bench_derive(c: &mut Criterion) {
    let salt = Salt::from_bytes([7u8; 16]);
    let params = KdfParams::default();
    c.bench_function("derive_key_default", |b| {
        b.iter(|| derive_key("correct horse", &salt, &params))
    });
}

fn bench_seal_open(c: &mut Criterion) {
    let vault = SecretVault::new(Arc::new(MemoryStore::new()));
    let record = vault.seal("sk-test-1234", "correct horse").unwrap();

    c.bench_function("seal", |b| {
        b.iter(|| vault.seal("sk-test-1234", "correct horse").unwrap())
    });
    c.bench_function("open", |b| {
        b.iter(|| vault.open(&record, "correct horse").unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_derive, bench_seal_open
}
criterion_main!(benches);
