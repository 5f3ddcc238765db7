//! Rainbow table generation.
//!
//! [`TableGeneration`] is a synchronous task: every call to `next` computes one batch of
//! chains in parallel and yields an [`Event`]. The table is only built once every batch has
//! been computed, so a cancelled generation never exposes a partial table.

use std::{
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::unbounded;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    batch::{BatchInfo, BatchIterator},
    cancel::CancelToken,
    ctx::{estimated_coverage, RainbowTableCtx},
    error::{ChainbreakError, ChainbreakResult},
    event::{Event, SimpleTableHandle},
    plaintext_to_string,
    rainbow_table::{RainbowChain, RainbowTable, SimpleTable},
    Password, DEFAULT_PROGRESS_INTERVAL,
};

/// Diagnostics about a generated table.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Time spent computing the chains.
    pub duration: Duration,
    /// Number of chains stored in the table.
    pub chains: usize,
    /// Number of distinct endpoints.
    pub unique_endpoints: usize,
    /// Number of hash operations performed.
    pub total_hash_ops: u64,
    /// Hash operations per second.
    pub hash_rate: f64,
    /// Estimated coverage of the keyspace, in percent.
    pub estimated_coverage: f64,
    /// Estimated memory used by the table, in bytes.
    pub memory_footprint: usize,
}

/// A table generation, computed batch by batch.
pub struct TableGeneration {
    ctx: RainbowTableCtx,
    startpoints: Vec<Password>,
    batches: BatchIterator,
    chains: Vec<RainbowChain>,
    cancel: CancelToken,
    elapsed: Duration,
}

impl TableGeneration {
    /// Creates a generation of `ctx.m` chains with random startpoints.
    pub fn new(ctx: RainbowTableCtx) -> Self {
        Self::with_rng(ctx, &mut StdRng::from_entropy())
    }

    /// Creates a generation of `ctx.m` chains whose startpoints are drawn from a seeded RNG.
    /// Two generations with the same context and seed produce the same table.
    pub fn with_seed(ctx: RainbowTableCtx, seed: u64) -> Self {
        Self::with_rng(ctx, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng(ctx: RainbowTableCtx, rng: &mut StdRng) -> Self {
        let startpoints = (0..ctx.m)
            .map(|_| ctx.charset.random_plaintext(rng, ctx.password_length))
            .collect();

        Self::from_startpoints(ctx, startpoints)
    }

    /// Creates a generation of one chain per given startpoint.
    pub fn from_startpoints(ctx: RainbowTableCtx, startpoints: Vec<Password>) -> Self {
        Self {
            batches: BatchIterator::new(startpoints.len() as u64, DEFAULT_PROGRESS_INTERVAL),
            chains: Vec::with_capacity(startpoints.len()),
            startpoints,
            ctx,
            cancel: CancelToken::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Creates a generation of one chain per given startpoint,
    /// checking that every startpoint belongs to the keyspace of the context.
    pub fn try_from_startpoints<I, P>(ctx: RainbowTableCtx, startpoints: I) -> ChainbreakResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let startpoints = startpoints
            .into_iter()
            .map(|startpoint| {
                let startpoint = startpoint.as_ref();
                if startpoint.len() != ctx.password_length as usize
                    || !ctx.charset.contains_all(startpoint)
                {
                    return Err(ChainbreakError::Plaintext(plaintext_to_string(startpoint)));
                }

                Ok(startpoint.iter().copied().collect())
            })
            .collect::<ChainbreakResult<Vec<Password>>>()?;

        Ok(Self::from_startpoints(ctx, startpoints))
    }

    /// Sets the number of chains computed between two events.
    pub fn progress_interval(mut self, chains: u64) -> Self {
        self.batches = BatchIterator::new(self.startpoints.len() as u64, chains);
        self.chains.clear();

        self
    }

    /// Uses the given token to cancel this generation.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;

        self
    }

    /// Returns the context of the table being generated.
    pub fn ctx(&self) -> &RainbowTableCtx {
        &self.ctx
    }

    /// Returns the progress of the generation, in percent.
    pub fn progress(&self) -> f64 {
        if self.startpoints.is_empty() {
            return 100.;
        }

        self.chains.len() as f64 / self.startpoints.len() as f64 * 100.
    }

    /// Discards the computed chains and starts over with the same startpoints.
    pub fn restart(&mut self) {
        self.chains.clear();
        self.batches.skip_to(0);
        self.elapsed = Duration::ZERO;
    }

    fn compute_batch(&mut self, batch_info: &BatchInfo) {
        let ctx = &self.ctx;
        let range = batch_info.range.start as usize..batch_info.range.end as usize;

        let batch_chains: Vec<RainbowChain> = self.startpoints[range]
            .par_iter()
            .map(|startpoint| RainbowChain::new(startpoint.clone(), ctx))
            .collect();

        self.chains.extend(batch_chains);
    }

    /// Computes the remaining batches and builds the table.
    pub fn finish(mut self) -> ChainbreakResult<(SimpleTable, BuildReport)> {
        while self.next().is_some() {}

        if self.cancel.is_cancelled() {
            info!("table generation cancelled");
            return Err(ChainbreakError::Cancelled);
        }

        let total_hash_ops = self.chains.len() as u64 * (self.ctx.t + 1);
        let estimated_coverage = estimated_coverage(
            self.startpoints.len() as u64,
            self.ctx.t,
            self.ctx.charset.len(),
            self.ctx.password_length,
        );
        let duration = self.elapsed;
        let table = SimpleTable::from_chains(self.chains, self.ctx);

        let hash_rate = if duration.is_zero() {
            0.
        } else {
            total_hash_ops as f64 / duration.as_secs_f64()
        };

        let report = BuildReport {
            duration,
            chains: table.len(),
            unique_endpoints: table.unique_endpoints(),
            total_hash_ops,
            hash_rate,
            estimated_coverage,
            memory_footprint: table.memory_footprint(),
        };

        info!(
            chains = report.chains,
            unique_endpoints = report.unique_endpoints,
            duration = ?report.duration,
            "rainbow table generated"
        );

        Ok((table, report))
    }

    /// Runs the generation in a background thread.
    pub fn spawn(self) -> SimpleTableHandle {
        let (sender, receiver) = unbounded();
        let cancel = self.cancel.clone();

        let thread_handle = thread::spawn(move || {
            let mut generation = self;

            while let Some(event) = generation.next() {
                // nobody listening is fine, the table is still returned by `join`
                let _ = sender.send(event);
                let _ = sender.send(Event::Progress(generation.progress()));
            }

            generation.finish()
        });

        SimpleTableHandle {
            thread_handle,
            receiver,
            cancel,
        }
    }
}

impl Iterator for TableGeneration {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let batch_info = self.batches.next()?;
        if batch_info.number == 0 {
            info!(
                chains = self.startpoints.len(),
                chain_length = self.ctx.t,
                hash_function = %self.ctx.hash_function,
                "generating rainbow table"
            );
        }

        let start = Instant::now();
        self.compute_batch(&batch_info);
        self.elapsed += start.elapsed();

        debug!(
            batch = batch_info.number + 1,
            batches = batch_info.count,
            "batch computed"
        );

        Some(Event::Batch {
            batch_number: batch_info.number + 1,
            batch_count: batch_info.count,
            chains: batch_info.range,
        })
    }
}

impl SimpleTable {
    /// Creates a new simple rainbow table with random startpoints.
    pub fn new(ctx: RainbowTableCtx) -> ChainbreakResult<Self> {
        TableGeneration::new(ctx).finish().map(|(table, _)| table)
    }

    /// Creates a new simple rainbow table in a background thread.
    /// Returns an handle to get events related to the generation and to get the generated table.
    pub fn new_nonblocking(ctx: RainbowTableCtx) -> SimpleTableHandle {
        TableGeneration::new(ctx).spawn()
    }

    /// Creates a new simple rainbow table with a chain for each given startpoint.
    pub fn from_startpoints<I, P>(startpoints: I, ctx: RainbowTableCtx) -> ChainbreakResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        TableGeneration::try_from_startpoints(ctx, startpoints)?
            .finish()
            .map(|(table, _)| table)
    }
}
