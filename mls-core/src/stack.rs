//! The stack-based Merkle combine engine: a flat stack of `(level, digest)`
//! entries, pushed one leaf at a time, where two adjacent entries at equal
//! level collapse into one entry at `level + 1`. No full tree is ever
//! materialized.

use crate::capability::{hash_once, HashCapability, MAX_DIGEST};

/// Borrowed view over a caller-provided work-area buffer, split into its
/// level bytes and digest bytes. `lvl[i]` is the Merkle level of stack
/// entry `i`; `dig[i*b..(i+1)*b]` is its digest.
pub(crate) struct Stack<'a> {
    pub(crate) lvl: &'a mut [u8],
    pub(crate) dig: &'a mut [u8],
    pub(crate) b: usize,
}

impl<'a> Stack<'a> {
    pub(crate) fn lvl_at(&self, i: usize) -> u8 {
        self.lvl[i]
    }

    pub(crate) fn set_lvl(&mut self, i: usize, v: u8) {
        self.lvl[i] = v;
    }

    pub(crate) fn dig_at(&self, i: usize) -> &[u8] {
        &self.dig[i * self.b..(i + 1) * self.b]
    }

    pub(crate) fn dig_at_mut(&mut self, i: usize) -> &mut [u8] {
        &mut self.dig[i * self.b..(i + 1) * self.b]
    }

    /// The contiguous `2b`-byte window covering entries `i` and `i+1`,
    /// exactly the bytes a combine step hashes together.
    fn dig_pair(&self, i: usize) -> &[u8] {
        &self.dig[i * self.b..(i + 2) * self.b]
    }
}

/// Splits a caller's work-area buffer (sized by `wa_sz`/`rc_sz`) into its
/// level-byte and digest-byte regions for a stack capable of holding
/// `depth` entries at digest width `b`.
pub(crate) fn split_work_area(work: &mut [u8], depth: usize, b: usize) -> Stack<'_> {
    let (lvl, dig) = work.split_at_mut(depth);
    Stack { lvl, dig, b }
}

/// Folds adjacent equal-level entries at the top of the stack into one,
/// repeatedly, stopping at `barrier` (entries below `barrier` are never
/// touched; this protects a frozen sub-range during signing while the
/// rest of the stack keeps growing).
pub(crate) fn combine<C: HashCapability>(cap: &C, ctx: &mut C::Context, stack: &mut Stack, j: &mut usize, barrier: usize) {
    while *j > barrier && stack.lvl_at(*j - 1) == stack.lvl_at(*j) {
        *j -= 1;
        let new_level = stack.lvl_at(*j) + 1;
        stack.set_lvl(*j, new_level);
        let mut tmp = [0u8; MAX_DIGEST];
        hash_once(cap, ctx, stack.dig_pair(*j), &mut tmp[..stack.b]);
        stack.dig_at_mut(*j).copy_from_slice(&tmp[..stack.b]);
    }
}

/// Writes a level-0 entry at index `j` whose digest is `hash(src)`, runs
/// `combine` from it, and advances `j` past the (possibly now much taller)
/// resulting entry. This is the whole "stream a leaf in" operation used by
/// `public_root` and by both halves of `sign`'s side stacks.
pub(crate) fn push_hash_of<C: HashCapability>(
    cap: &C,
    ctx: &mut C::Context,
    stack: &mut Stack,
    j: &mut usize,
    barrier: usize,
    src: &[u8],
) {
    stack.set_lvl(*j, 0);
    let mut tmp = [0u8; MAX_DIGEST];
    hash_once(cap, ctx, src, &mut tmp[..stack.b]);
    stack.dig_at_mut(*j).copy_from_slice(&tmp[..stack.b]);
    combine(cap, ctx, stack, j, barrier);
    *j += 1;
}

/// As `push_hash_of`, but the digest is already known (e.g. a recorded
/// right-stack entry being replayed during recovery) rather than computed
/// from a preimage.
pub(crate) fn push_known_digest<C: HashCapability>(
    cap: &C,
    ctx: &mut C::Context,
    stack: &mut Stack,
    j: &mut usize,
    barrier: usize,
    level: u8,
    digest: &[u8],
) {
    stack.set_lvl(*j, level);
    stack.dig_at_mut(*j).copy_from_slice(digest);
    combine(cap, ctx, stack, j, barrier);
    *j += 1;
}

/// Writes a single leaf entry at index `j` (level 0) without running
/// `combine`. Used only by the recoverer's Lamport bit loop, which must
/// place *both* leaves of a bit before combining them as a pair (see
/// `recover::recover`).
pub(crate) fn set_leaf_known(stack: &mut Stack, j: usize, bytes: &[u8]) {
    stack.set_lvl(j, 0);
    stack.dig_at_mut(j).copy_from_slice(bytes);
}

pub(crate) fn set_leaf_hashed<C: HashCapability>(
    cap: &C,
    ctx: &mut C::Context,
    stack: &mut Stack,
    j: usize,
    src: &[u8],
) {
    stack.set_lvl(j, 0);
    let mut tmp = [0u8; MAX_DIGEST];
    hash_once(cap, ctx, src, &mut tmp[..stack.b]);
    stack.dig_at_mut(j).copy_from_slice(&tmp[..stack.b]);
}
