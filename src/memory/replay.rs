use std::ops::Index;

use rand::{seq::index, Rng};

use crate::ds::RingBuffer;

use super::Transition;

/// A fixed-size memory of [transitions](Transition), dropping the oldest once full
///
/// Positions handed out by [`sample`](ReplayMemory::sample) are relative to the current content:
/// `0` is the oldest transition still held and `len() - 1` the newest.
pub struct ReplayMemory {
    memory: RingBuffer<Transition>,
    total: u64,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
            total: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Number of transitions ever stored, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The `seq` the next stored transition should carry
    pub fn next_seq(&self) -> u64 {
        self.total
    }

    /// Add a new transition, evicting the oldest if the memory is full
    pub fn push(&mut self, transition: Transition) {
        self.memory.push(transition);
        self.total += 1;
    }

    pub fn get(&self, position: usize) -> Option<&Transition> {
        self.memory.get(position)
    }

    pub fn newest(&self) -> Option<&Transition> {
        self.memory.newest()
    }

    pub fn newest_mut(&mut self) -> Option<&mut Transition> {
        self.memory.newest_mut()
    }

    /// The transition recorded right after the one at `position`, if it is still held
    pub fn successor(&self, position: usize) -> Option<&Transition> {
        self.memory.get(position + 1)
    }

    /// Iterate from the oldest transition to the newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Transition> + ExactSizeIterator {
        self.memory.iter()
    }

    /// Sample `batch_size` distinct positions uniformly at random
    ///
    /// ### Returns
    /// - `Some(positions)` if `batch_size` is less than or equal to the memory length
    /// - `None` otherwise
    pub fn sample(&self, batch_size: usize, rng: &mut impl Rng) -> Option<Vec<usize>> {
        (batch_size <= self.len()).then(|| index::sample(rng, self.len(), batch_size).into_vec())
    }
}

impl Index<usize> for ReplayMemory {
    type Output = Transition;

    fn index(&self, position: usize) -> &Self::Output {
        &self.memory[position]
    }
}
