//! Concrete [`mls_core::HashCapability`] implementations built on top of
//! `sha2`/`ripemd` rather than hand-rolling a hash: a SHA-256 and a
//! RIPEMD-128 capability.

use mls_core::HashCapability;
use ripemd::Ripemd128;
use sha2::{Digest, Sha256};

/// `h = 5` (`B = 32` bytes) SHA-256 capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Capability;

impl HashCapability for Sha256Capability {
    type Context = Sha256;

    fn digest_len(&self) -> usize {
        32
    }

    fn allocate(&self) -> Option<Self::Context> {
        Some(Sha256::new())
    }

    fn init(&self, ctx: &mut Self::Context) {
        *ctx = Sha256::new();
    }

    fn update(&self, ctx: &mut Self::Context, data: &[u8]) {
        Digest::update(ctx, data);
    }

    fn finalize(&self, ctx: &mut Self::Context, out: &mut [u8]) {
        out.copy_from_slice(&ctx.clone().finalize());
    }
}

/// `h = 4` (`B = 16` bytes) RIPEMD-128 capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ripemd128Capability;

impl HashCapability for Ripemd128Capability {
    type Context = Ripemd128;

    fn digest_len(&self) -> usize {
        16
    }

    fn allocate(&self) -> Option<Self::Context> {
        Some(Ripemd128::new())
    }

    fn init(&self, ctx: &mut Self::Context) {
        *ctx = Ripemd128::new();
    }

    fn update(&self, ctx: &mut Self::Context, data: &[u8]) {
        Digest::update(ctx, data);
    }

    fn finalize(&self, ctx: &mut Self::Context, out: &mut [u8]) {
        out.copy_from_slice(&ctx.clone().finalize());
    }
}
