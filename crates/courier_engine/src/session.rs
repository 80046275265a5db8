use std::sync::Arc;

use courier_core::{ResolvedConnection, SessionOutcome};
use courier_logging::{courier_debug, courier_info};

use crate::QbitApi;

/// Triggers the programmatic login; the server keeps the session via its cookie.
#[derive(Clone)]
pub struct SessionAuthenticator {
    api: Arc<dyn QbitApi>,
}

impl SessionAuthenticator {
    pub fn new(api: Arc<dyn QbitApi>) -> Self {
        Self { api }
    }

    pub async fn authenticate(&self, connection: &ResolvedConnection) -> SessionOutcome {
        let Some(endpoint) = connection.endpoint.configured() else {
            return SessionOutcome::LegacyRequired;
        };

        match self.api.login(endpoint, &connection.credentials).await {
            Ok(body) => {
                let outcome = SessionOutcome::from_login_body(&body);
                if outcome.is_established() {
                    courier_debug!("Session established with {}", endpoint);
                } else {
                    courier_info!(
                        "Login to {} was not accepted ({} byte body)",
                        endpoint,
                        body.len()
                    );
                }
                outcome
            }
            Err(err) => {
                courier_info!("Login to {} failed: {}", endpoint, err);
                SessionOutcome::LegacyRequired
            }
        }
    }
}
