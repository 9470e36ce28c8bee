use std::collections::{HashMap, VecDeque};

use serde_json::Value;

const DEFAULT_CAPACITY: usize = 1024;

/// Outcome of looking up an idempotency key.
#[derive(Debug, PartialEq)]
pub enum Replay {
    /// Key not seen; apply the action and record the result.
    Fresh,
    /// Key seen for the same action; return the stored response.
    Stored(Value),
    /// Key seen for a different action.
    Mismatch,
}

/// Remembers the responses of mutating requests by client-supplied key so a
/// retried request never applies twice. Oldest keys are forgotten first.
#[derive(Debug)]
pub struct IdempotencyLedger {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, (String, Value)>,
}

impl Default for IdempotencyLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl IdempotencyLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        IdempotencyLedger {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    /// `action` identifies what the key was used for, e.g. the request path.
    pub fn check(&self, key: &str, action: &str) -> Replay {
        match self.entries.get(key) {
            None => Replay::Fresh,
            Some((stored_action, response)) if stored_action == action => {
                Replay::Stored(response.clone())
            }
            Some(_) => Replay::Mismatch,
        }
    }

    pub fn record(&mut self, key: &str, action: &str, response: Value) {
        if self
            .entries
            .insert(key.to_string(), (action.to_string(), response))
            .is_none()
        {
            self.order.push_back(key.to_string());
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}
