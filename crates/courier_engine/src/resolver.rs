use std::sync::Arc;

use courier_core::settings::{present, CONNECTION_KEYS, DEFAULT_CATEGORY};
use courier_core::{resolve_connection, ConnectionSettings, ResolvedConnection};
use courier_logging::courier_warn;

use crate::ConfigStore;

/// Reads connection settings fresh from the store for every operation.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn ConfigStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Never fails: an unreadable store resolves to an unconfigured endpoint.
    pub async fn resolve(&self) -> ResolvedConnection {
        let values = match self.store.get(&CONNECTION_KEYS).await {
            Ok(values) => values,
            Err(err) => {
                courier_warn!("Reading connection settings failed: {}", err);
                Default::default()
            }
        };
        let settings = ConnectionSettings::from_lookup(|key| values.get(key).cloned());
        resolve_connection(&settings)
    }

    pub async fn default_category(&self) -> Option<String> {
        match self.store.get(&[DEFAULT_CATEGORY]).await {
            Ok(values) => present(&values.get(DEFAULT_CATEGORY).cloned()).map(ToOwned::to_owned),
            Err(err) => {
                courier_warn!("Reading default category failed: {}", err);
                None
            }
        }
    }
}
