use std::ops::Range;

/// Informations about a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInfo {
    /// The 0-indexed number of this batch.
    pub number: u64,
    /// The total number of batches.
    pub count: u64,
    /// The chains computed in this batch.
    pub range: Range<u64>,
}

/// An iterator splitting the chains to generate into fixed-size batches.
#[derive(Clone, Debug)]
pub struct BatchIterator {
    chains_len: u64,
    batch_size: u64,
    batch_number: u64,
    batches: u64,
}

impl BatchIterator {
    /// Creates a new batch iterator where `chains_len` is the total number of chains to generate.
    /// A `batch_size` of 0 is treated as 1.
    pub fn new(chains_len: u64, batch_size: u64) -> Self {
        let batch_size = batch_size.max(1);

        Self {
            chains_len,
            batch_size,
            batch_number: 0,
            batches: chains_len.div_ceil(batch_size),
        }
    }

    /// Restarts the iteration from the given batch.
    pub fn skip_to(&mut self, batch_number: u64) {
        self.batch_number = batch_number.min(self.batches);
    }
}

impl Iterator for BatchIterator {
    type Item = BatchInfo;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_number == self.batches {
            return None;
        }

        let start = self.batch_number * self.batch_size;
        let end = (start + self.batch_size).min(self.chains_len);

        let batch_info = BatchInfo {
            number: self.batch_number,
            count: self.batches,
            range: start..end,
        };

        self.batch_number += 1;

        Some(batch_info)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.batches - self.batch_number) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchIterator {}

#[cfg(test)]
mod tests {
    use crate::batch::BatchIterator;

    #[test]
    fn test_batches_cover_all_chains() {
        let ranges: Vec<_> = BatchIterator::new(250, 100).map(|b| b.range).collect();
        assert_eq!(vec![0..100, 100..200, 200..250], ranges);
    }

    #[test]
    fn test_exact_batches() {
        let batches = BatchIterator::new(300, 100);
        assert_eq!(3, batches.len());
        assert!(batches.clone().all(|b| b.count == 3 && b.range.end - b.range.start == 100));
    }

    #[test]
    fn test_empty_and_zero_size() {
        assert_eq!(0, BatchIterator::new(0, 100).count());
        assert_eq!(5, BatchIterator::new(5, 0).count());
    }

    #[test]
    fn test_skip_to() {
        let mut batches = BatchIterator::new(250, 100);
        batches.skip_to(2);
        assert_eq!(Some(200..250), batches.next().map(|b| b.range));
        assert_eq!(None, batches.next());
    }
}
