use std::sync::Arc;

use crate::config::Config;
use crate::documents::RequirementsStore;
use crate::store::{ClientStore, CostLookup, EmployeeStore, OfferStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub clients: Arc<dyn ClientStore>,
    pub offers: Arc<dyn OfferStore>,
    pub costs: Arc<dyn CostLookup>,
    pub requirements: Arc<dyn RequirementsStore>,
    pub config: Config,
}

impl AppState {
    /// Wires every store port to the same adapter.
    pub fn new<S>(store: S, requirements: Arc<dyn RequirementsStore>, config: Config) -> Self
    where
        S: EmployeeStore + ClientStore + OfferStore + CostLookup + 'static,
    {
        let store = Arc::new(store);
        Self {
            employees: store.clone(),
            clients: store.clone(),
            offers: store.clone(),
            costs: store,
            requirements,
            config,
        }
    }
}
