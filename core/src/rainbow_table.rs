mod simple;

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    cancel::CancelToken,
    chain::generate_chain,
    cracker::Cracker,
    ctx::RainbowTableCtx,
    error::{ChainbreakError, ChainbreakResult},
    Digest, Password,
};

pub use simple::{SimpleTable, SimpleTableIterator, TableRecord};

/// A chain of the rainbow table, made of a startpoint and an endpoint.
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct RainbowChain {
    pub startpoint: Password,
    pub endpoint: Digest,
}

impl RainbowChain {
    /// Computes the chain starting at `startpoint`.
    pub fn new(startpoint: Password, ctx: &RainbowTableCtx) -> RainbowChain {
        let endpoint = generate_chain(&startpoint, ctx);

        RainbowChain {
            startpoint,
            endpoint,
        }
    }

    pub fn from_parts(startpoint: Password, endpoint: Digest) -> RainbowChain {
        RainbowChain {
            startpoint,
            endpoint,
        }
    }
}

/// Trait that data structures implement to be used as rainbow tables.
/// A rainbow table is immutable once built.
pub trait RainbowTable: Sized + Sync + Serialize + for<'a> Deserialize<'a> {
    /// The type of the iterator over the chains of the table.
    type Iter<'a>: Iterator<Item = RainbowChain>
    where
        Self: 'a;

    /// Returns the number of chains stored in the table.
    fn len(&self) -> usize;

    /// Returns true if the table is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the chains of the table.
    /// The chains are not expected to be returned in a particular order.
    fn iter(&self) -> Self::Iter<'_>;

    /// Searches the endpoints for a digest.
    /// Returns the startpoints of every chain ending with this digest, possibly none.
    fn search_endpoints(&self, endpoint: &Digest) -> &[Password];

    /// Returns the context.
    fn ctx(&self) -> &RainbowTableCtx;

    /// Returns an estimate of the memory used by the table, in bytes.
    fn memory_footprint(&self) -> usize;

    /// Searches for a plaintext that hashes to the given digest.
    /// A digest of the wrong length is an error, not a plaintext that wasn't found.
    fn search(&self, digest: &Digest) -> ChainbreakResult<Option<Password>> {
        Cracker::new(self)
            .crack_digest(digest, &CancelToken::new())
            .map(|report| report.plaintext)
    }

    /// Stores this rainbow table to the given path.
    fn store(&self, path: &Path) -> ChainbreakResult<()> {
        let file = File::options()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let buf_writer = BufWriter::with_capacity(1024 * 1024, file);
        bincode::serialize_into(buf_writer, self).map_err(ChainbreakError::Serialize)?;

        Ok(())
    }

    /// Loads a rainbow table stored at the given path.
    fn load(path: &Path) -> ChainbreakResult<Self> {
        let file = File::open(path)?;
        let buf_reader = BufReader::with_capacity(1024 * 1024, file);
        let table =
            bincode::deserialize_from(buf_reader).map_err(ChainbreakError::Deserialize)?;

        Ok(table)
    }
}
