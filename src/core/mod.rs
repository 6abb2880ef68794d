pub mod bench;
pub mod chemistry;
pub mod session;

pub use crate::domain::events::{CommandResult, LabEvent, Notice, Rejection};
pub use crate::domain::model::{IndicatorColor, Readouts, VesselKind};
pub use crate::domain::ports::Notifier;
pub use crate::utils::error::Result;
