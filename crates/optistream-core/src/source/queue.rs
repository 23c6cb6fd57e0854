use std::collections::VecDeque;

use super::{SourceError, StreamEvent, Transport};

/// In-memory transport delivering pre-built events in push order.
///
/// Suited to embedding the coordinator behind another delivery mechanism,
/// and to tests.
#[derive(Debug)]
pub struct QueueTransport {
    pending: VecDeque<StreamEvent>,
    accept: bool,
    started: bool,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            accept: true,
            started: false,
        }
    }

    /// Transport whose handshake always fails.
    pub fn refusing() -> Self {
        Self {
            accept: false,
            ..Self::new()
        }
    }

    pub fn push(&mut self, event: StreamEvent) {
        self.pending.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for QueueTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<StreamEvent> for QueueTransport {
    fn from_iter<I: IntoIterator<Item = StreamEvent>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
            ..Self::new()
        }
    }
}

impl Transport for QueueTransport {
    fn start(&mut self) -> Result<bool, SourceError> {
        self.started = self.accept;
        Ok(self.accept)
    }

    fn next_event(&mut self) -> Result<Option<StreamEvent>, SourceError> {
        if !self.started {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }

    fn stop(&mut self) {
        self.started = false;
    }
}
