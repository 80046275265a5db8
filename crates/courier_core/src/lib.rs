//! Courier core: pure controller state machine, connection resolution and UI message types.
mod action;
mod effect;
mod health;
mod job;
mod menu;
mod msg;
mod pending;
mod session;
pub mod settings;
mod state;
mod update;
mod view_model;

pub use action::{Action, CategoryInfo, Notification, Reply};
pub use effect::Effect;
pub use health::{HealthState, Indicator, ProbeOutcome};
pub use job::{SubmissionJob, SubmissionResult};
pub use menu::{menu_entries, send_title, MenuEntry, MenuItem};
pub use msg::Msg;
pub use pending::{AutomationKind, PendingLoginTabs};
pub use session::{SessionOutcome, LOGIN_SUCCESS_BODY};
pub use settings::{
    resolve_connection, ConnectionSettings, Credentials, Endpoint, ResolvedConnection,
    ServerEndpoint, SettingChange,
};
pub use state::{ControllerState, RequestId, TabId};
pub use update::update;
pub use view_model::ControllerView;
