use std::sync::Arc;

use crate::db::DynStore;
use crate::services::{AuthGate, ConnectionGraph, IdentityService, SearchRanker};

/// Shared by every handler. Holds no mutable state of its own: each service
/// is a thin handle over the same store.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub identities: IdentityService,
    pub graph: ConnectionGraph,
    pub search: SearchRanker,
}

impl AppState {
    pub fn new(store: DynStore, auth: AuthGate) -> Self {
        Self {
            auth: Arc::new(auth),
            identities: IdentityService::new(store.clone()),
            graph: ConnectionGraph::new(store.clone()),
            search: SearchRanker::new(store),
        }
    }
}
