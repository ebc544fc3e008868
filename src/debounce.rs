//! Trailing-edge debouncing
//!
//! A [`Debouncer`] remembers at most one pending action per key. Scheduling
//! the same key again supersedes the earlier one: its ticket goes stale and
//! firing it does nothing. Hosts either arm a timer per [`Ticket`] and call
//! [`Debouncer::fire`] when it elapses, or call [`Debouncer::poll`] from a
//! frame loop.

use std::collections::HashMap;
use std::hash::Hash;

/// Handle for one scheduled run of a deferred action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticket<K> {
    pub key: K,
    generation: u64,
    /// Delay the host timer should use (ms)
    pub delay_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    deadline_ms: f64,
}

/// Per-key trailing-edge debouncer
#[derive(Debug)]
pub struct Debouncer<K> {
    quiet_window_ms: f64,
    next_generation: u64,
    pending: HashMap<K, Pending>,
}

impl<K: Copy + Eq + Hash> Debouncer<K> {
    pub fn new(quiet_window_ms: f64) -> Self {
        Self {
            quiet_window_ms: quiet_window_ms.max(0.0),
            next_generation: 0,
            pending: HashMap::new(),
        }
    }

    /// Schedule `key` to run after the quiet window, cancelling any earlier run
    pub fn schedule(&mut self, key: K, now_ms: f64) -> Ticket<K> {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(
            key,
            Pending {
                generation,
                deadline_ms: now_ms + self.quiet_window_ms,
            },
        );
        Ticket {
            key,
            generation,
            delay_ms: self.quiet_window_ms,
        }
    }

    /// Consume a ticket whose timer elapsed.
    ///
    /// Returns true if it is still the latest for its key, meaning the action
    /// should run now.
    pub fn fire(&mut self, ticket: Ticket<K>) -> bool {
        match self.pending.get(&ticket.key) {
            Some(p) if p.generation == ticket.generation => {
                self.pending.remove(&ticket.key);
                true
            }
            _ => false,
        }
    }

    /// Take every key whose quiet window has passed
    pub fn poll(&mut self, now_ms: f64) -> Vec<K> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline_ms <= now_ms)
            .map(|(k, _)| *k)
            .collect();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }

    /// Drop a pending run; returns whether one existed
    pub fn cancel(&mut self, key: K) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }
}
