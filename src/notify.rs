//! Transient notifications ("toasts") raised by dashboard operations.
//!
//! Notifications stack, expire on their own after a fixed time-to-live and
//! never need acknowledgement. A cap on the stack depth is optional; when
//! set, the oldest notification is dropped to make room.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    /// CSS class used by the HTML adapter.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic id, unique within one center.
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub raised_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: Duration,
    max_stack: Option<usize>,
    next_id: u64,
    active: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL, None)
    }
}

impl NotificationCenter {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

    /// `max_stack = None` keeps every live notification.
    pub fn new(ttl: Duration, max_stack: Option<usize>) -> Self {
        Self {
            ttl,
            max_stack: max_stack.filter(|cap| *cap > 0),
            next_id: 1,
            active: VecDeque::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        self.push_at(severity, message, Instant::now())
    }

    pub fn push_at(&mut self, severity: Severity, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push_back(Notification {
            id,
            severity,
            message: message.into(),
            raised_at: now,
        });
        if let Some(cap) = self.max_stack {
            while self.active.len() > cap {
                self.active.pop_front();
            }
        }
        id
    }

    /// Drop notifications older than the TTL and return them.
    pub fn expire(&mut self, now: Instant) -> Vec<Notification> {
        let mut expired = Vec::new();
        while let Some(front) = self.active.front() {
            if now.saturating_duration_since(front.raised_at) < self.ttl {
                break;
            }
            if let Some(n) = self.active.pop_front() {
                expired.push(n);
            }
        }
        expired
    }

    /// Live notifications, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    /// Live notifications raised after `id`.
    pub fn since(&self, id: u64) -> impl Iterator<Item = &Notification> {
        self.active.iter().filter(move |n| n.id > id)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.active.back()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
