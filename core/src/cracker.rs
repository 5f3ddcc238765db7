//! Reverse lookup of a digest in a rainbow table.
//!
//! The cracker walks the chain positions from the endpoint down to the startpoint. For each
//! position it computes the endpoint the target digest would lead to, and looks it up in the
//! table (cheap). Only when the lookup succeeds are the matching chains replayed from their
//! startpoints (expensive), and only a replay reproducing the target digest is trusted: a
//! matching endpoint alone may be a false alarm caused by a reduction collision.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::{
    cancel::CancelToken,
    chain::{candidate_endpoint, ChainWalk},
    error::{ChainbreakError, ChainbreakResult},
    plaintext_to_string,
    rainbow_table::RainbowTable,
    Digest, Password,
};

/// The outcome of an attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackReport {
    /// The plaintext found, verified to hash to the target digest.
    pub plaintext: Option<Password>,
    /// Time spent searching.
    pub duration: Duration,
    /// Number of chain positions probed.
    /// Positions are probed in parallel, so a few more may be probed than strictly needed.
    pub columns_probed: u64,
    /// Number of candidate endpoints found in the table.
    pub endpoint_hits: u64,
    /// Number of chains replayed without reproducing the target digest.
    pub false_alarms: u64,
}

impl CrackReport {
    pub fn found(&self) -> bool {
        self.plaintext.is_some()
    }

    /// Returns the plaintext as a string, if one was found.
    pub fn plaintext_string(&self) -> Option<String> {
        self.plaintext.as_deref().map(plaintext_to_string)
    }
}

#[derive(Default)]
struct Counters {
    columns_probed: AtomicU64,
    endpoint_hits: AtomicU64,
    false_alarms: AtomicU64,
}

/// Searches a rainbow table for the plaintext of a digest.
pub struct Cracker<'a, T: RainbowTable> {
    table: &'a T,
}

impl<'a, T: RainbowTable> Cracker<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self { table }
    }

    /// Cracks an hexadecimal digest.
    /// The digest is checked against the table's hash function before any work is done.
    pub fn crack(&self, hex_digest: &str, cancel: &CancelToken) -> ChainbreakResult<CrackReport> {
        let digest = self.table.ctx().hash_function.parse_digest(hex_digest)?;
        self.crack_digest(&digest, cancel)
    }

    /// Cracks a raw digest.
    pub fn crack_digest(
        &self,
        digest: &Digest,
        cancel: &CancelToken,
    ) -> ChainbreakResult<CrackReport> {
        let ctx = self.table.ctx();
        let hash_function = ctx.hash_function;

        if digest.len() != hash_function.digest_size() {
            return Err(ChainbreakError::DigestLength {
                hash_function,
                expected: hash_function.hex_len(),
                actual: digest.len() * 2,
            });
        }

        info!(digest = %hex::encode(digest), "searching the rainbow table");

        let start = Instant::now();
        let counters = Counters::default();

        // Range<u64> doesn't implement IndexedParallelIterator, hence the usize.
        // find_map_first keeps the result a sequential scan from the top would give.
        let plaintext = (0..ctx.t as usize + 1)
            .into_par_iter()
            .rev()
            .find_map_first(|column| {
                if cancel.is_cancelled() {
                    return Some(Err(ChainbreakError::Cancelled));
                }

                self.search_column(column as u64, digest, &counters).map(Ok)
            })
            .transpose()?;

        let report = CrackReport {
            plaintext,
            duration: start.elapsed(),
            columns_probed: counters.columns_probed.into_inner(),
            endpoint_hits: counters.endpoint_hits.into_inner(),
            false_alarms: counters.false_alarms.into_inner(),
        };

        match report.plaintext_string() {
            Some(plaintext) => info!(plaintext = %plaintext, duration = ?report.duration, "plaintext found"),
            None => info!(duration = ?report.duration, "no plaintext found"),
        }

        Ok(report)
    }

    /// Searches for the digest as if it appeared at the given column of a chain.
    fn search_column(&self, column: u64, digest: &Digest, counters: &Counters) -> Option<Password> {
        let ctx = self.table.ctx();
        counters.columns_probed.fetch_add(1, Ordering::Relaxed);

        let endpoint = candidate_endpoint(digest, column, ctx);
        let startpoints = self.table.search_endpoints(&endpoint);

        if startpoints.is_empty() {
            return None;
        }

        counters.endpoint_hits.fetch_add(1, Ordering::Relaxed);
        debug!(
            column,
            chains = startpoints.len(),
            "candidate endpoint found"
        );

        for startpoint in startpoints {
            if let Some(plaintext) = self.replay(startpoint, digest) {
                return Some(plaintext);
            }

            counters.false_alarms.fetch_add(1, Ordering::Relaxed);
            trace!(
                column,
                startpoint = %plaintext_to_string(startpoint),
                "false alarm"
            );
        }

        None
    }

    /// Replays the whole chain and returns the plaintext hashing to the digest, if any.
    fn replay(&self, startpoint: &Password, digest: &Digest) -> Option<Password> {
        ChainWalk::new(startpoint, self.table.ctx())
            .find(|(_, chain_digest)| chain_digest == digest)
            .map(|(plaintext, _)| plaintext)
    }
}

/// The result of a success rate test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuccessRate {
    pub attempts: u32,
    pub successes: u32,
}

impl SuccessRate {
    /// Returns the success rate, in percent.
    pub fn percent(&self) -> f64 {
        if self.attempts == 0 {
            return 0.;
        }

        self.successes as f64 / self.attempts as f64 * 100.
    }
}

/// Hashes random plaintexts of the table's keyspace and tries to crack them.
pub fn success_rate<T: RainbowTable, R: Rng + ?Sized>(
    table: &T,
    attempts: u32,
    rng: &mut R,
    cancel: &CancelToken,
) -> ChainbreakResult<SuccessRate> {
    let ctx = table.ctx();
    let cracker = Cracker::new(table);
    let mut successes = 0;

    for _ in 0..attempts {
        let plaintext = ctx.charset.random_plaintext(rng, ctx.password_length);
        let digest = ctx.hash_function.digest(&plaintext);

        if cracker.crack_digest(&digest, cancel)?.found() {
            successes += 1;
        }
    }

    Ok(SuccessRate {
        attempts,
        successes,
    })
}
