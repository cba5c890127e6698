mod listing;
mod state;
mod store;

pub use store::{InMemoryStore, StoreOperation, DEFAULT_OWNER, DEFAULT_PAGE_SIZE};

use std::sync::Arc;

use crate::{
    domain::value_objects::Credentials,
    ports::storage::{AdminOps, UpstreamConnector, UpstreamStore},
};

/// Hands every caller the same in-memory upstream, whatever their credentials
#[derive(Clone, Default)]
pub struct MemoryConnector {
    store: InMemoryStore,
}

impl MemoryConnector {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

impl UpstreamConnector for MemoryConnector {
    fn connect(&self, _credentials: &Credentials) -> Arc<dyn UpstreamStore> {
        Arc::new(self.store.clone())
    }

    fn admin_ops(&self) -> Arc<dyn AdminOps> {
        Arc::new(self.store.clone())
    }
}
