//! Benchmarks `public_root` and `sign` at small `(h, s)` pairs. Real
//! hash-sig tree heights run into the hundreds of thousands of leaves;
//! `mls-core`'s private key is `2^(2h+s+4)` bytes, so this bench keeps `s`
//! at 8-10, large enough to exercise the stack-combine and carry-scan logic
//! repeatedly, small enough to finish.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mls_core::{pr_sz, public_root, sg_sz, sign, wa_sz};

struct ToyHash {
    b: usize,
}

impl mls_core::HashCapability for ToyHash {
    type Context = Vec<u8>;

    fn digest_len(&self) -> usize {
        self.b
    }

    fn allocate(&self) -> Option<Self::Context> {
        Some(Vec::with_capacity(64))
    }

    fn init(&self, ctx: &mut Self::Context) {
        ctx.clear();
    }

    fn update(&self, ctx: &mut Self::Context, data: &[u8]) {
        ctx.extend_from_slice(data);
    }

    fn finalize(&self, ctx: &mut Self::Context, out: &mut [u8]) {
        for slot in out.iter_mut() {
            *slot = 0;
        }
        for (i, byte) in ctx.iter().enumerate() {
            out[i % self.b] ^= byte;
        }
        out[0] ^= ctx.len() as u8;
    }
}

fn bench_public_root(c: &mut Criterion) {
    let h = 4u32;
    let s = 8u32;
    let cap = ToyHash { b: 1 << h };
    let private = vec![0u8; pr_sz(h, s) as usize];
    let mut work = vec![0u8; wa_sz(h, s) as usize];
    c.bench_function("public_root h=4 s=8", |b| {
        b.iter(|| {
            let root = public_root(&cap, h, s, black_box(&private), &mut work).unwrap();
            black_box(root.len());
        })
    });
}

fn bench_sign(c: &mut Criterion) {
    let h = 4u32;
    let s = 8u32;
    let cap = ToyHash { b: 1 << h };
    let private = vec![0u8; pr_sz(h, s) as usize];
    let mut work = vec![0u8; wa_sz(h, s) as usize];
    let msg = vec![0u8; 1 << h];
    let mut sig = vec![0u8; sg_sz(h, s) as usize];
    c.bench_function("sign h=4 s=8", |b| {
        b.iter(|| {
            let written = sign(&cap, h, s, black_box(&private), &mut work, &msg, 1, &mut sig).unwrap();
            black_box(written);
        })
    });
}

criterion_group!(benches, bench_public_root, bench_sign);
criterion_main!(benches);
