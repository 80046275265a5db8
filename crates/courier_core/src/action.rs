use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{SubmissionResult, TabId};

/// Requests arriving from UI surfaces (popup, settings page, category picker).
///
/// Wire format is tagged by `action`, e.g. `{"action":"getCategories"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    /// Open the server's own web UI, falling back to the interactive login.
    #[serde(rename = "openQbit")]
    OpenRemoteUi,
    /// Open the web UI and switch off its cross-site request protection.
    #[serde(rename = "disableCSRF")]
    DisableCrossSiteProtection,
    #[serde(rename = "getCategories")]
    ListCategories,
    #[serde(rename = "createCategory", rename_all = "camelCase")]
    CreateCategory {
        category_name: String,
        #[serde(default)]
        save_path: Option<String>,
    },
    #[serde(rename = "addTorrentWithCategory")]
    SubmitJob {
        url: String,
        #[serde(default)]
        category: Option<String>,
    },
}

/// Category metadata as returned by `torrents/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "savePath", default)]
    pub save_path: String,
}

/// Answer to one [`Action`], serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    RemoteUi { tab: Option<TabId> },
    Categories(BTreeMap<String, CategoryInfo>),
    CategoryCreated(bool),
    Submitted(SubmissionResult),
}

/// Pushed to the page that initiated a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Notification {
    #[serde(rename = "torrentAdded")]
    TorrentAdded {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl From<SubmissionResult> for Notification {
    fn from(result: SubmissionResult) -> Self {
        Notification::TorrentAdded {
            success: result.success,
            error: result.error,
        }
    }
}
