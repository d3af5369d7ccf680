use std::fmt;
use std::sync::Arc;

use crate::traits::DebugLogProvider;

/// Handle identifying one registration, even when the same provider instance
/// is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// Registration-ordered collection of providers
#[derive(Default)]
pub struct ProviderSet {
    next_id: u64,
    entries: Vec<(ProviderId, Arc<dyn DebugLogProvider>)>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: Arc<dyn DebugLogProvider>) -> ProviderId {
        let id = ProviderId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, provider));
        id
    }

    pub fn remove(&mut self, id: ProviderId) -> Option<Arc<dyn DebugLogProvider>> {
        let index = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Providers in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn DebugLogProvider>> {
        self.entries
            .iter()
            .map(|(_, provider)| Arc::clone(provider))
            .collect()
    }

    pub fn ids(&self) -> Vec<ProviderId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|(id, provider)| (id, provider.id())),
            )
            .finish()
    }
}
