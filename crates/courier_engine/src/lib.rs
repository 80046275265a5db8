//! Courier engine: qBittorrent Web API client, session and submission services,
//! and the controller loop that executes core effects.
mod automation;
mod categories;
mod client;
mod controller;
mod effects;
mod health;
mod host;
mod pipeline;
mod resolver;
mod session;
mod store;
mod types;

pub use automation::PageAutomation;
pub use categories::CategoryService;
pub use client::{ApiSettings, QbitApi, ReqwestQbitApi};
pub use controller::{Controller, ControllerHandle, ControllerSettings};
pub use health::HealthMonitor;
pub use host::{HostError, PopupSpec, TabHost, ToolbarHost};
pub use pipeline::SubmissionPipeline;
pub use resolver::CredentialResolver;
pub use session::SessionAuthenticator;
pub use store::{ConfigStore, MemoryConfigStore, StoreError};
pub use types::{ApiError, ControllerError, FailureKind};
