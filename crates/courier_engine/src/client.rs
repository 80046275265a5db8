use std::collections::BTreeMap;
use std::time::Duration;

use courier_core::{CategoryInfo, Credentials, ServerEndpoint, SubmissionJob};

use crate::{ApiError, FailureKind};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Upper bound for the health probe.
    pub probe_timeout: Duration,
    /// Upper bound for login, add and category calls.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// The subset of the qBittorrent Web API (v2) the controller talks to.
#[async_trait::async_trait]
pub trait QbitApi: Send + Sync {
    /// `GET app/version`, bounded by the probe timeout.
    async fn app_version(&self, endpoint: &ServerEndpoint) -> Result<String, ApiError>;

    /// `POST auth/login`. Returns the response body whatever the status.
    async fn login(
        &self,
        endpoint: &ServerEndpoint,
        credentials: &Credentials,
    ) -> Result<String, ApiError>;

    /// `POST torrents/add`.
    async fn add_torrents(
        &self,
        endpoint: &ServerEndpoint,
        job: &SubmissionJob,
    ) -> Result<(), ApiError>;

    /// `GET torrents/categories`.
    async fn categories(
        &self,
        endpoint: &ServerEndpoint,
    ) -> Result<BTreeMap<String, CategoryInfo>, ApiError>;

    /// `POST torrents/createCategory`.
    async fn create_category(
        &self,
        endpoint: &ServerEndpoint,
        name: &str,
        save_path: &str,
    ) -> Result<(), ApiError>;
}

/// reqwest-backed client. One instance keeps one cookie jar, which carries the
/// session cookie set by a successful login to later calls on the same endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestQbitApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestQbitApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::ClientSetup, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn post_form(
        &self,
        endpoint: &ServerEndpoint,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, ApiError> {
        self.client
            .post(endpoint.api_url(path))
            .timeout(self.settings.request_timeout)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl QbitApi for ReqwestQbitApi {
    async fn app_version(&self, endpoint: &ServerEndpoint) -> Result<String, ApiError> {
        let response = self
            .client
            .get(endpoint.api_url("app/version"))
            .timeout(self.settings.probe_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = require_success(response)?;
        response.text().await.map_err(map_reqwest_error)
    }

    async fn login(
        &self,
        endpoint: &ServerEndpoint,
        credentials: &Credentials,
    ) -> Result<String, ApiError> {
        let response = self
            .post_form(
                endpoint,
                "auth/login",
                &[
                    ("username", credentials.username()),
                    ("password", credentials.password()),
                ],
            )
            .await?;
        response.text().await.map_err(map_reqwest_error)
    }

    async fn add_torrents(
        &self,
        endpoint: &ServerEndpoint,
        job: &SubmissionJob,
    ) -> Result<(), ApiError> {
        let urls = job.urls_field();
        let mut form = vec![("urls", urls.as_str())];
        if let Some(category) = job.category() {
            form.push(("category", category));
        }
        let response = self.post_form(endpoint, "torrents/add", &form).await?;
        require_success(response).map(|_| ())
    }

    async fn categories(
        &self,
        endpoint: &ServerEndpoint,
    ) -> Result<BTreeMap<String, CategoryInfo>, ApiError> {
        let response = self
            .client
            .get(endpoint.api_url("torrents/categories"))
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = require_success(response)?;
        response
            .json::<BTreeMap<String, CategoryInfo>>()
            .await
            .map_err(map_reqwest_error)
    }

    async fn create_category(
        &self,
        endpoint: &ServerEndpoint,
        name: &str,
        save_path: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .post_form(
                endpoint,
                "torrents/createCategory",
                &[("category", name), ("savePath", save_path)],
            )
            .await?;
        require_success(response).map(|_| ())
    }
}

fn require_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::InvalidResponse, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
