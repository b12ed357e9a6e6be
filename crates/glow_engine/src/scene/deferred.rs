//! Cross-thread deferred calls
//!
//! Producer threads hand closures to a [`DeferredSender`]; the simulation
//! thread runs them against its own state at the start of the next update.
//! A drain only runs the calls that were pending when it started, so a call
//! that defers another call never extends the current drain.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use thiserror::Error;

/// Error returned by a deferred call
pub type CallError = Box<dyn std::error::Error + Send + Sync>;

/// A queued call against the simulation state `T`
pub type DeferredCall<T> = Box<dyn FnOnce(&mut T) -> Result<(), CallError> + Send>;

/// The receiving queue was dropped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Deferred call queue is closed")]
pub struct QueueClosed;

/// Producer handle, cheap to clone and safe to move across threads
pub struct DeferredSender<T> {
    tx: Sender<DeferredCall<T>>,
}

impl<T> Clone for DeferredSender<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> std::fmt::Debug for DeferredSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredSender").field("pending", &self.tx.len()).finish()
    }
}

impl<T> DeferredSender<T> {
    /// Enqueue a call without blocking
    pub fn put<F>(&self, call: F) -> Result<(), QueueClosed>
    where
        F: FnOnce(&mut T) -> Result<(), CallError> + Send + 'static,
    {
        self.tx.send(Box::new(call)).map_err(|_| QueueClosed)
    }
}

/// Unbounded multi-producer, single-consumer queue of [`DeferredCall`]s
pub struct DeferredCallQueue<T> {
    tx: Sender<DeferredCall<T>>,
    rx: Receiver<DeferredCall<T>>,
}

impl<T> Default for DeferredCallQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for DeferredCallQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredCallQueue").field("pending", &self.rx.len()).finish()
    }
}

impl<T> DeferredCallQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// New producer handle
    pub fn sender(&self) -> DeferredSender<T> {
        DeferredSender { tx: self.tx.clone() }
    }

    /// Enqueue a call from the owning thread
    pub fn put<F>(&self, call: F)
    where
        F: FnOnce(&mut T) -> Result<(), CallError> + Send + 'static,
    {
        // the queue holds its own receiver, so the channel cannot be closed here
        let _ = self.tx.send(Box::new(call));
    }

    /// Number of calls waiting
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Snapshot of the calls pending right now
    ///
    /// The batch yields at most that many calls, oldest first, and does not
    /// borrow the queue. Calls it does not yield stay queued.
    pub fn batch(&self) -> DeferredBatch<T> {
        DeferredBatch {
            rx: self.rx.clone(),
            remaining: self.rx.len(),
        }
    }

    /// Run the pending snapshot against `target`
    ///
    /// Stops at the first failing call and leaves the rest queued. Returns
    /// the number of calls that ran.
    pub fn drain_into(&self, target: &mut T) -> Result<usize, CallError> {
        let mut executed = 0;
        for call in self.batch() {
            call(target)?;
            executed += 1;
        }
        Ok(executed)
    }
}

/// Calls taken from a [`DeferredCallQueue`] snapshot
pub struct DeferredBatch<T> {
    rx: Receiver<DeferredCall<T>>,
    remaining: usize,
}

impl<T> Iterator for DeferredBatch<T> {
    type Item = DeferredCall<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match self.rx.try_recv() {
            Ok(call) => Some(call),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                self.remaining = 0;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[derive(Default)]
    struct Log {
        entries: Vec<String>,
        queue: Option<DeferredSender<Log>>,
    }

    #[test]
    fn test_calls_run_in_submission_order() {
        let queue = DeferredCallQueue::<Log>::new();
        for name in ["a", "b", "c"] {
            queue.put(move |log| {
                log.entries.push(name.to_string());
                Ok(())
            });
        }

        let mut log = Log::default();
        assert_eq!(queue.drain_into(&mut log).unwrap(), 3);
        assert_eq!(log.entries, vec!["a", "b", "c"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_call_deferred_during_drain_waits_for_next_drain() {
        let queue = DeferredCallQueue::<Log>::new();
        let mut log = Log {
            queue: Some(queue.sender()),
            ..Log::default()
        };

        queue.put(|log| {
            log.entries.push("first".to_string());
            if let Some(queue) = &log.queue {
                queue.put(|log| {
                    log.entries.push("later".to_string());
                    Ok(())
                })?;
            }
            Ok(())
        });

        assert_eq!(queue.drain_into(&mut log).unwrap(), 1);
        assert_eq!(log.entries, vec!["first"]);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.drain_into(&mut log).unwrap(), 1);
        assert_eq!(log.entries, vec!["first", "later"]);
    }

    #[test]
    fn test_per_producer_order_is_preserved_across_threads() {
        let queue = DeferredCallQueue::<Vec<(usize, usize)>>::new();

        let producers: Vec<_> = (0..4)
            .map(|producer| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for seq in 0..100 {
                        sender
                            .put(move |seen: &mut Vec<(usize, usize)>| {
                                seen.push((producer, seq));
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut seen = Vec::new();
        assert_eq!(queue.drain_into(&mut seen).unwrap(), 400);
        for producer in 0..4 {
            let order: Vec<usize> = seen.iter().filter(|(p, _)| *p == producer).map(|(_, s)| *s).collect();
            assert_eq!(order, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_failure_leaves_remaining_calls_queued() {
        let queue = DeferredCallQueue::<Vec<u32>>::new();
        queue.put(|v| {
            v.push(1);
            Ok(())
        });
        queue.put(|_| Err("boom".into()));
        queue.put(|v| {
            v.push(3);
            Ok(())
        });

        let mut values = Vec::new();
        let err = queue.drain_into(&mut values).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(values, vec![1]);
        assert_eq!(queue.pending(), 1);

        queue.drain_into(&mut values).unwrap();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn test_sender_reports_closed_queue() {
        let queue = DeferredCallQueue::<()>::new();
        let sender = queue.sender();
        drop(queue);
        assert_eq!(sender.put(|_| Ok(())), Err(QueueClosed));
    }
}
