use std::sync::Arc;

use courier_core::{HealthState, ProbeOutcome};
use courier_logging::{courier_debug, courier_trace};

use crate::{CredentialResolver, QbitApi};

/// Probes the configured endpoint. Every failure is folded into the outcome.
#[derive(Clone)]
pub struct HealthMonitor {
    resolver: CredentialResolver,
    api: Arc<dyn QbitApi>,
}

impl HealthMonitor {
    pub fn new(resolver: CredentialResolver, api: Arc<dyn QbitApi>) -> Self {
        Self { resolver, api }
    }

    pub async fn probe(&self) -> ProbeOutcome {
        let connection = self.resolver.resolve().await;
        let Some(endpoint) = connection.endpoint.configured() else {
            courier_trace!("Health probe skipped: endpoint not configured");
            return ProbeOutcome::Unconfigured;
        };

        match self.api.app_version(endpoint).await {
            Ok(version) => {
                courier_trace!("Server {} answered version {}", endpoint, version.trim());
                ProbeOutcome::Responded
            }
            Err(err) => {
                courier_debug!("Health probe against {} failed: {}", endpoint, err);
                ProbeOutcome::Failed
            }
        }
    }

    /// Probe and map straight to a state, for callers outside the controller loop.
    pub async fn check(&self) -> HealthState {
        HealthState::from_probe(self.probe().await)
    }
}
