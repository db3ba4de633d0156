//! Cryptographic operation benchmarks
//!
//! Run with: `cargo bench --bench crypto_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use keystore_lib::{bech32, crypto};

const NPUB: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";

fn secret(n: u8) -> [u8; 32] {
    let mut bytes = [0x11u8; 32];
    bytes[31] = n;
    bytes
}

fn bench_bech32_decode(c: &mut Criterion) {
    c.bench_function("bech32_decode_npub", |b| {
        b.iter(|| {
            let decoded = bech32::decode_bytes(black_box(NPUB), false);
            black_box(decoded)
        })
    });
}

fn bench_event_id(c: &mut Criterion) {
    let pubkey = hex::encode(crypto::derive_public_key(&secret(1)).unwrap_or_default());
    let tags = vec![vec!["p".to_string(), pubkey.clone()]];

    c.bench_function("event_id", |b| {
        b.iter(|| {
            let id = crypto::compute_event_id(
                black_box(&pubkey),
                1_700_000_000,
                1,
                &tags,
                black_box("benchmark content"),
            );
            black_box(id)
        })
    });
}

/// BIP-340 signing and verification
fn bench_schnorr(c: &mut Criterion) {
    let key = secret(1);
    let digest = [7u8; 32];
    let public_key = crypto::derive_public_key(&key).unwrap_or_default();
    let signature = crypto::sign(&digest, &key).unwrap_or([0u8; 64]);

    c.bench_function("schnorr_sign", |b| {
        b.iter(|| black_box(crypto::sign(black_box(&digest), &key)))
    });
    c.bench_function("schnorr_verify", |b| {
        b.iter(|| {
            black_box(crypto::verify_signature(
                black_box(&digest),
                &signature,
                &public_key,
            ))
        })
    });
}

fn bench_ecdh(c: &mut Criterion) {
    let ours = secret(1);
    let peer = crypto::derive_public_key(&secret(2)).unwrap_or_default();

    c.bench_function("ecdh_shared_secret", |b| {
        b.iter(|| black_box(crypto::derive_shared_secret(&ours, black_box(&peer))))
    });
}

/// NIP-04 envelope encryption at different payload sizes
fn bench_envelope(c: &mut Criterion) {
    let key = [3u8; 32];
    let mut group = c.benchmark_group("nip04_encrypt");

    for size in [64usize, 1024, 16384] {
        let plaintext = "x".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{}_bytes", size), |b| {
            b.iter(|| black_box(crypto::encrypt(black_box(&plaintext), &key)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_bech32_decode,
    bench_event_id,
    bench_schnorr,
    bench_ecdh,
    bench_envelope
);
criterion_main!(benches);
