#![forbid(unsafe_code)]

mod app;
mod config;
mod logging;
mod manifest;
mod terminal;

pub use app::{AppError, Application, Outcome};
pub use config::{Config, ConfigError, ConfigFlags};
pub use logging::init_logging;
pub use manifest::{ManifestEntry, ManifestRegistry};
pub use terminal::{HELP, TerminalAdapter, parse_gesture};
