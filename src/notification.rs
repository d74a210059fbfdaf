//! Non-blocking user notices.
//!
//! The editor never pops dialogs. Failures that the user should know about
//! (unreadable clipboard data, export and session I/O) are queued here and the
//! host drains them into whatever toast mechanism it has.

use log::info;
use std::collections::VecDeque;

/// Oldest notices are dropped beyond this.
const MAX_PENDING: usize = 16;

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub summary: String,
    pub body: String,
}

impl Notice {
    pub fn new(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            body: body.into(),
        }
    }
}

/// FIFO of undisplayed notices.
#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        info!("Notice: {} - {}", notice.summary, notice.body);
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
        }
        self.pending.push_back(notice);
    }

    /// Takes every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_order_and_empties() {
        let mut queue = NoticeQueue::new();
        queue.push(Notice::new("a", "1"));
        queue.push(Notice::new("b", "2"));
        let drained = queue.drain();
        assert_eq!(drained[0].summary, "a");
        assert_eq!(drained[1].summary, "b");
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut queue = NoticeQueue::new();
        for i in 0..MAX_PENDING + 3 {
            queue.push(Notice::new(i.to_string(), ""));
        }
        assert_eq!(queue.len(), MAX_PENDING);
        assert_eq!(queue.drain()[0].summary, "3");
    }
}
