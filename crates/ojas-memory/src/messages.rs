//! Capacity-bounded chat log with FIFO eviction.

use crate::model::{ChatMessage, Message, Role};
use chrono::Utc;
use log::debug;
use std::collections::VecDeque;

/// Ordered chat turns, oldest first, never longer than `capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageLog {
    /// Create an empty log. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a log from persisted messages, trimming the oldest overflow.
    pub fn from_messages(messages: Vec<Message>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.messages = messages.into();
        let evicted = log.evict_overflow();
        if evicted > 0 {
            debug!("trimmed restored message log (evicted={evicted})");
        }
        log
    }

    /// Append a turn stamped with the current time.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.push_message(Message {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        })
    }

    /// Append a prebuilt message.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push_back(message);
        let evicted = self.evict_overflow();
        if evicted > 0 {
            debug!(
                "evicted oldest messages (evicted={}, capacity={})",
                evicted, self.capacity
            );
        }
    }

    /// The last `min(count, len)` turns, oldest first, without timestamps.
    pub fn recent(&self, count: usize) -> Vec<ChatMessage> {
        let start = self.messages.len().saturating_sub(count);
        self.messages.range(start..).map(ChatMessage::from).collect()
    }

    /// Timestamped view of every retained turn.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn evict_overflow(&mut self) -> usize {
        let overflow = self.messages.len().saturating_sub(self.capacity);
        self.messages.drain(..overflow);
        overflow
    }
}
