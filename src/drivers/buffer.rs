use std::collections::VecDeque;
use crate::drivers::ScopeError;
/// Fixed-capacity FIFO that keeps the most recent samples in append order.
///
/// Appending at capacity evicts the oldest entry first. Readers get copies via
/// [`RingBuffer::snapshot`] so a redraw never iterates live storage.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}
impl<T: Clone> RingBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Result<Self, ScopeError> {
        if capacity == 0 {
            return Err(ScopeError::InvalidCapacity);
        }
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn append(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn keeps_last_n_in_append_order() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        for i in 0..10 {
            ring.append(i);
        }
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.snapshot(), vec![6, 7, 8, 9]);
        assert_eq!(ring.last(), Some(&9));
    }
    #[test]
    fn below_capacity_nothing_is_evicted() {
        let mut ring = RingBuffer::with_capacity(1000).unwrap();
        ring.append(1.0);
        ring.append(2.0);
        assert_eq!(ring.snapshot(), vec![1.0, 2.0]);
        assert_eq!(ring.capacity(), 1000);
    }
    #[test]
    fn snapshot_is_detached_from_storage() {
        let mut ring = RingBuffer::with_capacity(2).unwrap();
        ring.append('a');
        let snap = ring.snapshot();
        ring.append('b');
        ring.append('c');
        assert_eq!(snap, vec!['a']);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec!['b', 'c']);
    }
    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            RingBuffer::<u8>::with_capacity(0),
            Err(ScopeError::InvalidCapacity)
        ));
    }
}
