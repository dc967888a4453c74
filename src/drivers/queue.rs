use crossbeam_channel::{Receiver, Sender};
/// Unbounded FIFO of raw lines between the reader thread and the frame
/// consumer. The consumer side only ever polls, it never blocks.
pub struct IngestQueue {
    tx: Sender<String>,
    rx: Receiver<String>,
}
impl IngestQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
    /// Producer handle for the reader thread.
    pub fn sender(&self) -> Sender<String> {
        self.tx.clone()
    }
    pub fn push(&self, line: String) {
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(line);
    }
    pub fn len(&self) -> usize {
        self.rx.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
    pub fn try_pop(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }
    /// Pops two lines at once, or nothing when fewer than two are queued.
    /// Sound because this queue has a single consumer.
    pub fn try_pop_pair(&self) -> Option<(String, String)> {
        if self.rx.len() < 2 {
            return None;
        }
        let first = self.rx.try_recv().ok()?;
        let second = self.rx.try_recv().ok()?;
        Some((first, second))
    }
}
impl Default for IngestQueue {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    #[test]
    fn preserves_fifo_order() {
        let queue = IngestQueue::new();
        queue.push("a".into());
        queue.push("b".into());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_pop().as_deref(), Some("a"));
        assert_eq!(queue.try_pop().as_deref(), Some("b"));
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }
    #[test]
    fn lone_line_is_not_paired() {
        let queue = IngestQueue::new();
        queue.push("Received: 1".into());
        assert!(queue.try_pop_pair().is_none());
        assert_eq!(queue.len(), 1);
        queue.push("Received: 2".into());
        assert_eq!(
            queue.try_pop_pair(),
            Some(("Received: 1".to_owned(), "Received: 2".to_owned()))
        );
    }
    #[test]
    fn accepts_lines_from_another_thread() {
        let queue = IngestQueue::new();
        let tx = queue.sender();
        thread::spawn(move || {
            for i in 0..100 {
                tx.send(i.to_string()).unwrap();
            }
        })
        .join()
        .unwrap();
        let drained: Vec<String> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(drained.len(), 100);
        assert_eq!(drained[0], "0");
        assert_eq!(drained[99], "99");
    }
}
