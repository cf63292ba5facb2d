/// Upper bound on the digest width `B = 2^h` this crate's stack machinery
/// will scratch-buffer on the stack. Covers SHA-256, RIPEMD-128, and every
/// smaller digest with headroom for SHA-512-class ones.
pub const MAX_DIGEST: usize = 64;

/// A hash function, injected as a capability: allocate a context, reuse it
/// across many init/update/finalize cycles within one call to
/// `public_root`/`sign`/`recover`, and let it drop when the caller is done.
///
/// There is no explicit `deallocate` operation; `Context` is expected to
/// free itself via `Drop` when it goes out of scope. See `DESIGN.md`.
pub trait HashCapability {
    /// Mutable hashing state, reused across calls to `init`/`update`/`finalize`.
    type Context;

    /// Digest width in bytes, `B = 2^h`. Must not exceed [`MAX_DIGEST`].
    fn digest_len(&self) -> usize;

    /// Allocate a fresh context. Returns `None` if the capability is
    /// unavailable.
    fn allocate(&self) -> Option<Self::Context>;

    /// Reset `ctx` to the start of a new hash computation.
    fn init(&self, ctx: &mut Self::Context);

    /// Feed bytes into the hash in progress.
    fn update(&self, ctx: &mut Self::Context, data: &[u8]);

    /// Write the finished digest into `out`, which is exactly `digest_len()`
    /// bytes long.
    fn finalize(&self, ctx: &mut Self::Context, out: &mut [u8]);
}

/// Runs one complete init/update/finalize cycle, writing `digest_len()`
/// bytes into `out`.
pub(crate) fn hash_once<C: HashCapability>(
    cap: &C,
    ctx: &mut C::Context,
    src: &[u8],
    out: &mut [u8],
) {
    cap.init(ctx);
    cap.update(ctx, src);
    cap.finalize(ctx, out);
}
