use std::collections::BTreeMap;
use std::sync::Arc;

use courier_core::CategoryInfo;
use courier_logging::courier_warn;

use crate::{CredentialResolver, QbitApi, SessionAuthenticator};

/// Pass-through category calls used by the settings page and the category picker.
#[derive(Clone)]
pub struct CategoryService {
    resolver: CredentialResolver,
    authenticator: SessionAuthenticator,
    api: Arc<dyn QbitApi>,
}

impl CategoryService {
    pub fn new(
        resolver: CredentialResolver,
        authenticator: SessionAuthenticator,
        api: Arc<dyn QbitApi>,
    ) -> Self {
        Self {
            resolver,
            authenticator,
            api,
        }
    }

    /// Empty on any failure.
    pub async fn list(&self) -> BTreeMap<String, CategoryInfo> {
        let connection = self.resolver.resolve().await;
        let Some(endpoint) = connection.endpoint.configured() else {
            return BTreeMap::new();
        };
        self.authenticator.authenticate(&connection).await;
        match self.api.categories(endpoint).await {
            Ok(categories) => categories,
            Err(err) => {
                courier_warn!("Listing categories on {} failed: {}", endpoint, err);
                BTreeMap::new()
            }
        }
    }

    pub async fn create(&self, name: &str, save_path: &str) -> bool {
        let connection = self.resolver.resolve().await;
        let Some(endpoint) = connection.endpoint.configured() else {
            return false;
        };
        self.authenticator.authenticate(&connection).await;
        match self.api.create_category(endpoint, name, save_path).await {
            Ok(()) => true,
            Err(err) => {
                courier_warn!("Creating category {:?} on {} failed: {}", name, endpoint, err);
                false
            }
        }
    }
}
