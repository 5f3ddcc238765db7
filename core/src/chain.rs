//! Chain primitives: the reduction function, chain generation and chain replay.

use std::{mem, ops::Range};

use crate::{charset::Charset, ctx::RainbowTableCtx, Digest, Password};

/// Reduces a digest into a plaintext of the given length.
///
/// Only the 8 first bytes of the digest are used as the seed, read as a big-endian integer
/// (that is, the 16 first hexadecimal characters). Longer digests are truncated, so that the
/// plaintexts produced stay the same for tables generated with any version of this function.
// The step is added in 128-bit arithmetic: `u64::MAX + step` must not wrap.
#[inline]
pub fn reduce(digest: &[u8], step: u64, length: u8, charset: &Charset) -> Password {
    let mut first_bytes = [0; 8];
    let n = digest.len().min(first_bytes.len());
    first_bytes[..n].copy_from_slice(&digest[..n]);

    let mut seed = u64::from_be_bytes(first_bytes) as u128 + step as u128;
    let base = charset.len() as u128;

    (0..length)
        .map(|_| {
            let c = charset.symbol((seed % base) as usize);
            seed /= base;
            c
        })
        .collect()
}

/// Continues a chain over the given columns: hashes then reduces once per column.
#[inline]
pub fn continue_chain(mut plaintext: Password, columns: Range<u64>, ctx: &RainbowTableCtx) -> Password {
    for step in columns {
        let digest = ctx.hash_function.digest(&plaintext);
        plaintext = reduce(&digest, step, ctx.password_length, &ctx.charset);
    }

    plaintext
}

/// Computes the endpoint of the chain starting at `start`.
/// The chain goes through `t + 1` digests, the last one being the endpoint.
#[inline]
pub fn generate_chain(start: &Password, ctx: &RainbowTableCtx) -> Digest {
    let last = continue_chain(start.clone(), 0..ctx.t, ctx);

    ctx.hash_function.digest(&last)
}

/// Computes the endpoint a chain would have if `digest` appeared at the given column.
/// At column `t`, the digest is its own endpoint.
#[inline]
pub fn candidate_endpoint(digest: &Digest, column: u64, ctx: &RainbowTableCtx) -> Digest {
    let mut digest = digest.clone();

    for step in column..ctx.t {
        let plaintext = reduce(&digest, step, ctx.password_length, &ctx.charset);
        digest = ctx.hash_function.digest(&plaintext);
    }

    digest
}

/// Walks a whole chain, yielding every (plaintext, digest) pair from the start
/// up to the endpoint, included.
pub struct ChainWalk<'a> {
    ctx: &'a RainbowTableCtx,
    plaintext: Password,
    step: u64,
}

impl<'a> ChainWalk<'a> {
    pub fn new(start: &Password, ctx: &'a RainbowTableCtx) -> Self {
        Self {
            ctx,
            plaintext: start.clone(),
            step: 0,
        }
    }
}

impl Iterator for ChainWalk<'_> {
    type Item = (Password, Digest);

    fn next(&mut self) -> Option<Self::Item> {
        if self.step > self.ctx.t {
            return None;
        }

        let digest = self.ctx.hash_function.digest(&self.plaintext);
        let plaintext = if self.step < self.ctx.t {
            let next = reduce(
                &digest,
                self.step,
                self.ctx.password_length,
                &self.ctx.charset,
            );
            mem::replace(&mut self.plaintext, next)
        } else {
            self.plaintext.clone()
        };

        self.step += 1;

        Some((plaintext, digest))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.ctx.t + 1).saturating_sub(self.step) as usize;
        (remaining, Some(remaining))
    }
}
