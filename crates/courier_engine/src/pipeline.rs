use std::sync::Arc;

use courier_core::{SessionOutcome, SubmissionJob, SubmissionResult};
use courier_logging::{courier_debug, courier_info, courier_warn};

use crate::{CredentialResolver, FailureKind, QbitApi, SessionAuthenticator};

/// Resolve, authenticate, add. One attempt per call, never queued or retried.
#[derive(Clone)]
pub struct SubmissionPipeline {
    resolver: CredentialResolver,
    authenticator: SessionAuthenticator,
    api: Arc<dyn QbitApi>,
}

impl SubmissionPipeline {
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

    pub async fn submit(&self, job: &SubmissionJob) -> SubmissionResult {
        if job.is_empty() {
            return SubmissionResult::no_source_urls();
        }
        let connection = self.resolver.resolve().await;
        let Some(endpoint) = connection.endpoint.configured() else {
            courier_warn!("Submission dropped: server not configured");
            return SubmissionResult::not_configured();
        };

        // A rejected login never aborts the add; some servers accept it without one.
        if self.authenticator.authenticate(&connection).await == SessionOutcome::LegacyRequired {
            courier_debug!("Submitting to {} without an established session", endpoint);
        }

        let result = match self.api.add_torrents(endpoint, job).await {
            Ok(()) => SubmissionResult::succeeded(),
            Err(err) => match err.kind {
                FailureKind::HttpStatus(status) => SubmissionResult::server_status(status),
                _ => SubmissionResult::unreachable(),
            },
        };

        courier_info!(
            "Submitted {} url(s) category={:?} to {}: success={} error={:?}",
            job.source_urls().len(),
            job.category(),
            endpoint,
            result.success,
            result.error
        );
        result
    }
}
