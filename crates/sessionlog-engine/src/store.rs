use sessionlog_types::{DiagnosticEvent, SessionResource};
use std::collections::HashSet;
use std::sync::Arc;

use crate::buffer::EventBuffer;
use crate::origin::ProviderOriginTracker;
use crate::query::EventFilter;

/// Where a stored event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Logged directly by the embedding system
    Internal,
    /// Returned or pushed by a provider
    Provider,
}

/// Buffer slot: the shared event plus its store-assigned sequence number
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub seq: u64,
    pub event: Arc<DiagnosticEvent>,
}

/// Ring buffer + origin tracker.
///
/// Every mutation keeps the tracker in step with the buffer: a sequence number
/// is only tracked while its event is still retained.
#[derive(Debug)]
pub struct EventStore {
    buffer: EventBuffer<StoredEvent>,
    origins: ProviderOriginTracker,
    next_seq: u64,
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity),
            origins: ProviderOriginTracker::new(),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn append(&mut self, event: DiagnosticEvent, origin: Origin) -> Arc<DiagnosticEvent> {
        let seq = self.next_seq;
        self.next_seq += 1;

        let event = Arc::new(event);
        if origin == Origin::Provider {
            self.origins.mark(seq);
        }

        if let Some(dropped) = self.buffer.append(StoredEvent {
            seq,
            event: Arc::clone(&event),
        }) {
            self.origins.forget(dropped.seq);
        }

        event
    }

    /// Remove the provider-sourced events of one session.
    ///
    /// Internally logged events of that session and all events of other
    /// sessions stay in place, in their original order.
    pub fn remove_provider_events(&mut self, session: &SessionResource) -> usize {
        let origins = &self.origins;
        let removed = self.buffer.compact(|stored| {
            stored.event.session_resource == *session && origins.is_provider_origin(stored.seq)
        });

        for stored in &removed {
            self.origins.forget(stored.seq);
        }
        removed.len()
    }

    pub fn is_provider_origin(&self, stored: &StoredEvent) -> bool {
        self.origins.is_provider_origin(stored.seq)
    }

    /// Origin of a retained event, looked up by identity rather than value.
    pub fn origin_of(&self, event: &Arc<DiagnosticEvent>) -> Option<Origin> {
        self.buffer
            .iter()
            .find(|stored| Arc::ptr_eq(&stored.event, event))
            .map(|stored| {
                if self.origins.is_provider_origin(stored.seq) {
                    Origin::Provider
                } else {
                    Origin::Internal
                }
            })
    }

    /// Stored events in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &StoredEvent> {
        self.buffer.iter()
    }

    /// Matching events sorted by `created`; ties keep insertion order.
    pub fn events(&self, filter: &EventFilter) -> Vec<Arc<DiagnosticEvent>> {
        let mut events: Vec<Arc<DiagnosticEvent>> = self
            .buffer
            .iter()
            .filter(|stored| filter.matches(&stored.event))
            .map(|stored| Arc::clone(&stored.event))
            .collect();
        events.sort_by_key(|event| event.created);
        events
    }

    /// Distinct sessions, oldest first-seen first
    pub fn session_resources(&self) -> Vec<SessionResource> {
        let mut seen = HashSet::new();
        self.buffer
            .iter()
            .map(|stored| &stored.event.session_resource)
            .filter(|session| seen.insert((*session).clone()))
            .cloned()
            .collect()
    }

    pub fn provider_event_count(&self) -> usize {
        self.origins.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.origins.clear();
    }
}
