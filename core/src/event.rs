use std::{ops::Range, panic, thread::JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError};

use crate::{
    cancel::CancelToken, error::ChainbreakResult, generation::BuildReport, SimpleTable,
};

/// An event to track the progress of the generation of a rainbow table.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Overall progress of the rainbow table generation in percent.
    Progress(f64),
    /// The nth batch of chains has been computed.
    Batch {
        batch_number: u64,
        batch_count: u64,
        chains: Range<u64>,
    },
}

/// A rainbow table being generated in a background thread.
pub struct SimpleTableHandle {
    pub(crate) thread_handle: JoinHandle<ChainbreakResult<(SimpleTable, BuildReport)>>,
    pub(crate) receiver: Receiver<Event>,
    pub(crate) cancel: CancelToken,
}

impl SimpleTableHandle {
    /// Returns the generated rainbow table.
    /// Blocks until the table is finished.
    pub fn join(self) -> ChainbreakResult<(SimpleTable, BuildReport)> {
        self.thread_handle
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload))
    }

    /// Blocks until an event is received.
    /// Returns `None` if the rainbow table is finished.
    pub fn recv(&self) -> Option<Event> {
        self.receiver.recv().ok()
    }

    /// Returns an event if one is pending.
    pub fn try_recv(&self) -> Option<Event> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stops the generation. `join` then returns `ChainbreakError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread_handle.is_finished()
    }
}
