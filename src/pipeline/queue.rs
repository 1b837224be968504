// src/pipeline/queue.rs
// =============================================================================
// This module implements the queue that connects two pipeline stages.
//
// How it works:
// 1. Producers push items onto the back of a VecDeque
// 2. Each push wakes up one waiting consumer
// 3. Consumers pop from the front; if the queue is empty they sleep until
//    the next push instead of spinning
//
// Guarantees:
// - FIFO: items come out in the order they went in
// - Unbounded: push never waits
// - Each item is handed to exactly one consumer
//
// Rust concepts:
// - VecDeque: Double-ended queue, push_back / pop_front
// - Mutex: Only one task touches the VecDeque at a time
// - Notify: Lets a task sleep until another task says "something changed"
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Unbounded FIFO queue with an async blocking pop.
#[derive(Debug)]
pub struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    /// Adds an item to the back and wakes one waiting consumer.
    pub fn push(&self, item: T) {
        self.lock().push_back(item);
        self.available.notify_one();
    }

    /// Removes the front item, waiting as long as it takes for one to arrive.
    pub async fn pop(&self) -> T {
        loop {
            if let Some(item) = self.try_pop() {
                return item;
            }

            // A push between the check and here leaves a permit behind,
            // so this returns straight away instead of missing it
            self.available.notified().await;
        }
    }

    /// Removes the front item if there is one, without waiting.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the VecDeque half-modified,
    // so a poisoned lock is still safe to use
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not just check is_empty() and then pop?
//    - With several consumers, another task can take the item between the
//      check and the pop
//    - Looping on is_empty() also burns CPU while the queue is empty
//    - pop() above does both steps under one lock and sleeps when empty
//
// 2. What is Notify?
//    - A tokio primitive for "wake me up when something happens"
//    - notify_one() wakes a single waiting task, or stores a permit if
//      nobody is waiting yet, so the next notified().await returns at once
//
// 3. Why std::sync::Mutex instead of tokio::sync::Mutex?
//    - The lock is only held for a push_back / pop_front, never across an
//      .await
//    - A std Mutex is simpler and faster in that case
//
// 4. Why &self everywhere?
//    - The queue is shared between two stages through an Arc<Queue<T>>
//    - Arc only hands out shared references, the Mutex provides the
//      mutability inside
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = Queue::new();
        queue.push("c1");
        queue.push("c2");
        queue.push("c3");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some("c1"));
        assert_eq!(queue.try_pop(), Some("c2"));
        assert_eq!(queue.try_pop(), Some("c3"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(Queue::new());

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.push(42);
        assert_eq!(consumer.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_each_item_goes_to_one_consumer() {
        let queue = Arc::new(Queue::new());

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { queue.pop().await })
            })
            .collect();

        for i in 0..4 {
            queue.push(i);
        }

        let mut received = Vec::new();
        for consumer in consumers {
            received.push(consumer.await.unwrap());
        }
        received.sort();
        assert_eq!(received, vec![0, 1, 2, 3]);
        assert!(queue.is_empty());
    }
}
