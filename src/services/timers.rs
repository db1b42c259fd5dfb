// src/services/timers.rs
//
// Deadline queue for cooperative timers
//
// One pending deadline per kind. Rescheduling a kind replaces its
// deadline, which is how a newer request supersedes an older retry.
// Nothing fires on its own: the owner calls `drain_due` from its tick.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct TimerQueue<K> {
    deadlines: HashMap<K, u64>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Ord> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: K, now_ms: u64, delay_ms: u64) {
        self.deadlines.insert(kind, now_ms.saturating_add(delay_ms));
    }

    pub fn cancel(&mut self, kind: K) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    pub fn is_scheduled(&self, kind: K) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn deadline(&self, kind: K) -> Option<u64> {
        self.deadlines.get(&kind).copied()
    }

    /// Removes and returns every kind whose deadline has passed,
    /// earliest first
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<K> {
        let mut due: Vec<(u64, K)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .map(|(kind, at)| (*at, *kind))
            .collect();
        due.sort();
        for (_, kind) in &due {
            self.deadlines.remove(kind);
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
