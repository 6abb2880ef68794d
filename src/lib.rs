pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConsoleLog, EventLog};
pub use app::BenchShell;
pub use config::LabConfig;
pub use crate::core::{bench::LabBench, session::TitrationSession};
pub use domain::events::{CommandResult, LabEvent, Notice, Rejection};
pub use domain::model::{IndicatorColor, Readouts, VesselKind};
pub use utils::error::{LabError, Result};
