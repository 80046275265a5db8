use serde::{Deserialize, Serialize};

/// One add-torrent request. Consumed by a single submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionJob {
    source_urls: Vec<String>,
    category: Option<String>,
}

impl SubmissionJob {
    /// Trims URLs and drops blank ones; a blank category becomes `None`.
    pub fn new<I, S>(source_urls: I, category: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let source_urls = source_urls
            .into_iter()
            .map(|url| url.as_ref().trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Self {
            source_urls,
            category,
        }
    }

    pub fn single(url: impl AsRef<str>, category: Option<String>) -> Self {
        Self::new([url], category)
    }

    pub fn source_urls(&self) -> &[String] {
        &self.source_urls
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.source_urls.is_empty()
    }

    /// Value of the `urls` form field: one URL per line.
    pub fn urls_field(&self) -> String {
        self.source_urls.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }

    pub fn server_status(status: u16) -> Self {
        Self::failed(format!("Server returned {status}"))
    }

    pub fn unreachable() -> Self {
        Self::failed("Server unreachable")
    }

    pub fn not_configured() -> Self {
        Self::failed("Server not configured")
    }

    pub fn no_source_urls() -> Self {
        Self::failed("No source URLs")
    }
}
