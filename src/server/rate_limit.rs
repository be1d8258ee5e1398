//! Per-client fixed-window rate limiting for the inbound endpoint.
//!
//! Counters live in memory and reset when their window elapses; nothing here
//! touches the resolution core, which stays limiter-free.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct WindowSlot {
    opened: Instant,
    used: u32,
}

/// Fixed-window limiter keyed by peer IP.
pub struct ClientRateLimiter {
    budget: u32,
    window: Duration,
    slots: Mutex<HashMap<IpAddr, WindowSlot>>,
}

impl ClientRateLimiter {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self {
            budget,
            window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// `true` when the request fits the client's current window; counts the
    /// request against the budget when it does.
    pub fn try_acquire(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap();

        // Keep the map bounded under churn from many distinct clients.
        if slots.len() > 4_096 {
            let window = self.window;
            slots.retain(|_, slot| now.duration_since(slot.opened) < window);
        }

        let slot = slots.entry(client).or_insert(WindowSlot {
            opened: now,
            used: 0,
        });
        if now.duration_since(slot.opened) >= self.window {
            slot.opened = now;
            slot.used = 0;
        }
        if slot.used >= self.budget {
            return false;
        }
        slot.used += 1;
        true
    }
}
