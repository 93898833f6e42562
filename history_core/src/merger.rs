use crate::normalizer::EnrichedRecord;
use std::collections::VecDeque;

/// Anything carrying a millisecond timestamp
pub trait Timestamped {
    fn timestamp(&self) -> u64;
}

impl Timestamped for EnrichedRecord {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Lazily merges sequences that are each sorted newest-first into one newest-first stream.
///
/// Every step compares the heads of all remaining queues and yields the strictly
/// newest one; on equal timestamps the earlier queue wins. With one queue per
/// transfer class the linear head scan is cheaper than a heap.
#[derive(Debug)]
pub struct ChronologicalMerge<T> {
    queues: Vec<VecDeque<T>>,
}

impl<T: Timestamped> ChronologicalMerge<T> {
    pub fn new<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
    {
        let queues = sequences
            .into_iter()
            .map(|sequence| sequence.into_iter().collect::<VecDeque<T>>())
            .filter(|queue| !queue.is_empty())
            .collect();
        Self { queues }
    }

    /// Records not yet yielded
    pub fn remaining(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }
}

impl<T: Timestamped> Iterator for ChronologicalMerge<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut newest: Option<(usize, u64)> = None;
        for (index, queue) in self.queues.iter().enumerate() {
            if let Some(head) = queue.front() {
                let timestamp = head.timestamp();
                match newest {
                    Some((_, best)) if timestamp <= best => {}
                    _ => newest = Some((index, timestamp)),
                }
            }
        }

        let (index, _) = newest?;
        let record = self.queues[index].pop_front();
        if self.queues[index].is_empty() {
            // remove, not swap_remove: queue order decides ties
            self.queues.remove(index);
        }
        record
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T: Timestamped> ExactSizeIterator for ChronologicalMerge<T> {}
