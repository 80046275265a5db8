mod app;
mod host;
mod logging;
mod persistence;

pub use app::run_app;
