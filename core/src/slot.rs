use std::sync::{Arc, RwLock};

use tracing::info;

use crate::rainbow_table::RainbowTable;

/// Holds the rainbow table currently used for attacks.
///
/// Tables are never modified in place: readers take a snapshot (an `Arc`) and keep using it
/// for the whole attack, while a newly generated table replaces the previous one in a single
/// step. A generation that fails or gets cancelled never reaches the slot.
pub struct TableSlot<T: RainbowTable> {
    current: RwLock<Option<Arc<T>>>,
}

impl<T: RainbowTable> Default for TableSlot<T> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }
}

impl<T: RainbowTable> TableSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot holding the given table.
    pub fn with_table(table: T) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(table))),
        }
    }

    /// Returns the current table, if any.
    pub fn snapshot(&self) -> Option<Arc<T>> {
        match self.current.read() {
            Ok(current) => current.clone(),
            // a writer only swaps an Arc, the slot is consistent even if it panicked
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the current table, returning the previous one.
    /// Readers holding a snapshot of the previous table are unaffected.
    pub fn publish(&self, table: T) -> Option<Arc<T>> {
        let table = Arc::new(table);
        info!(chains = table.len(), "publishing rainbow table");

        let mut current = match self.current.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };

        current.replace(table)
    }

    /// Removes the current table.
    pub fn clear(&self) -> Option<Arc<T>> {
        let mut current = match self.current.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };

        current.take()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use crate::{
        cancel::CancelToken,
        chain::generate_chain,
        ctx::build_test_ctx,
        error::ChainbreakError,
        generation::TableGeneration,
        password,
        rainbow_table::{RainbowTable, SimpleTable},
        slot::TableSlot,
    };

    #[test]
    fn test_snapshot_survives_publication() {
        let ctx = build_test_ctx();
        let first = SimpleTable::from_startpoints(["test@123"], ctx.clone()).unwrap();
        let second = SimpleTable::from_startpoints(["password", "qwertyui"], ctx).unwrap();

        let slot = TableSlot::with_table(first);
        let snapshot = slot.snapshot().unwrap();

        let previous = slot.publish(second).unwrap();
        assert!(Arc::ptr_eq(&snapshot, &previous));
        assert_eq!(1, snapshot.len());
        assert_eq!(2, slot.snapshot().unwrap().len());

        assert!(slot.clear().is_some());
        assert!(slot.snapshot().is_none());
    }

    #[test]
    fn test_cancelled_generation_keeps_published_table() {
        let ctx = build_test_ctx();
        let slot = TableSlot::with_table(
            SimpleTable::from_startpoints(["test@123"], ctx.clone()).unwrap(),
        );

        let cancel = CancelToken::new();
        cancel.cancel();
        let generation = TableGeneration::with_seed(ctx.clone(), 1).cancel_token(cancel);
        match generation.finish() {
            Ok((table, _)) => {
                slot.publish(table);
            }
            Err(err) => assert!(matches!(err, ChainbreakError::Cancelled)),
        }

        let table = slot.snapshot().unwrap();
        assert_eq!(1, table.len());
        assert_eq!(
            Some(&generate_chain(&password("test@123"), &ctx)),
            table.endpoint(b"test@123")
        );
    }

    #[test]
    fn test_concurrent_readers() {
        let ctx = build_test_ctx();
        let slot = Arc::new(TableSlot::new());
        slot.publish(SimpleTable::from_startpoints(["test@123"], ctx.clone()).unwrap());

        let digest = ctx.hash_function.digest(b"test@123");
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = slot.clone();
                let digest = digest.clone();
                thread::spawn(move || {
                    let table = slot.snapshot().unwrap();
                    table.search(&digest).unwrap()
                })
            })
            .collect();

        slot.publish(SimpleTable::from_startpoints(["password"], ctx).unwrap());

        for reader in readers {
            let found = reader.join().unwrap();
            // each reader sees one whole table: either the first one, or the second one
            if let Some(plaintext) = found {
                assert_eq!(b"test@123", plaintext.as_slice());
            }
        }
    }
}
