use std::collections::HashSet;

/// Marks which stored events came from a provider.
///
/// Entries are sequence numbers assigned by the store, never the events
/// themselves, so the tracker cannot keep an event alive. The store forgets a
/// sequence number when its event is evicted or compacted away.
#[derive(Debug, Default)]
pub struct ProviderOriginTracker {
    tagged: HashSet<u64>,
}

impl ProviderOriginTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, seq: u64) {
        self.tagged.insert(seq);
    }

    pub fn is_provider_origin(&self, seq: u64) -> bool {
        self.tagged.contains(&seq)
    }

    pub fn forget(&mut self, seq: u64) {
        self.tagged.remove(&seq);
    }

    pub fn clear(&mut self) {
        self.tagged.clear();
    }

    pub fn len(&self) -> usize {
        self.tagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tagged.is_empty()
    }
}
