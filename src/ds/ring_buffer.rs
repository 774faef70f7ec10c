#![allow(clippy::len_without_is_empty)]
use std::ops::Index;

/// A fixed-capacity ring buffer that evicts its oldest element once full
///
/// Elements are addressed logically: index `0` is the oldest element still held and `len() - 1` the newest.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the buffer length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element, and return the evicted one
    ///
    /// A zero-capacity buffer drops every element it is given.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }

        let ix = self.ix;
        let evicted = if ix >= self.len() {
            self.buffer.push(item);
            None
        } else {
            Some(std::mem::replace(&mut self.buffer[ix], item))
        };
        self.ix = (ix + 1) % self.capacity;
        evicted
    }

    /// Physical slot of the logical index `index`
    fn slot(&self, index: usize) -> usize {
        if self.is_full() {
            (self.ix + index) % self.capacity
        } else {
            index
        }
    }

    /// Get the element at logical index `index`, counting from the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.len()).then(|| &self.buffer[self.slot(index)])
    }

    /// The most recently pushed element
    pub fn newest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|ix| self.get(ix))
    }

    /// Mutable access to the most recently pushed element
    pub fn newest_mut(&mut self) -> Option<&mut T> {
        let ix = self.len().checked_sub(1)?;
        let slot = self.slot(ix);
        self.buffer.get_mut(slot)
    }

    /// Iterate from the oldest element to the newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        (0..self.len()).map(move |ix| &self.buffer[self.slot(ix)])
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        assert!(
            index < self.len(),
            "index {index} out of bounds for ring buffer of length {}",
            self.len()
        );
        &self.buffer[self.slot(index)]
    }
}
