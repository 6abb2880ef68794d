use crate::domain::model::VesselKind;
use std::fmt;
use thiserror::Error;

/// A state transition that happened on the bench.
#[derive(Debug, Clone, PartialEq)]
pub enum LabEvent {
    VesselPlaced(VesselKind),
    BuretteFitted,
    SampleAdded { volume_ml: f64 },
    IndicatorAdded,
    ValveOpened,
    ValveClosed,
    BuretteEmptied,
    Reset,
}

impl fmt::Display for LabEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabEvent::VesselPlaced(VesselKind::Flask) => write!(f, "Erlenmeyer flask placed."),
            LabEvent::VesselPlaced(VesselKind::Beaker) => write!(
                f,
                "Beaker placed. (Note: titrations normally use an Erlenmeyer flask)"
            ),
            LabEvent::BuretteFitted => write!(f, "Burette fitted and filled with NaOH."),
            LabEvent::SampleAdded { volume_ml } => {
                write!(f, "Pipetted {} mL of HCl sample into the vessel.", volume_ml)
            }
            LabEvent::IndicatorAdded => write!(f, "Added 3 drops of phenolphthalein."),
            LabEvent::ValveOpened => write!(f, "Burette valve opened. Dripping NaOH..."),
            LabEvent::ValveClosed => write!(f, "Burette valve closed."),
            LabEvent::BuretteEmptied => write!(f, "Burette is empty. Valve closed."),
            LabEvent::Reset => write!(f, "--- Bench reset ---"),
        }
    }
}

/// A command refused because the bench is not in the right state for it.
/// Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("A flask is already on the bench.")]
    VesselAlreadyPlaced,

    #[error("The bench already has a vessel on it.")]
    BenchOccupied,

    #[error("Place a flask on the bench first.")]
    VesselRequired,

    #[error("The burette is already fitted.")]
    BuretteAlreadyFitted,

    #[error("Fit a burette first.")]
    BuretteRequired,

    #[error("The vessel already has a sample.")]
    SampleAlreadyAdded,

    #[error("Add an HCl sample to the vessel first.")]
    SampleRequired,

    #[error("Indicator has already been added.")]
    IndicatorAlreadyAdded,

    #[error("The burette valve is already open.")]
    ValveAlreadyOpen,

    #[error("The burette valve is already closed.")]
    ValveAlreadyClosed,

    #[error("The burette is empty.")]
    BuretteEmpty,

    #[error("Cannot place {0} right now.")]
    CannotPlace(String),
}

pub type CommandResult = std::result::Result<LabEvent, Rejection>;

/// One line of the bench log.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Event(LabEvent),
    Rejected(Rejection),
}

impl Notice {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Notice::Rejected(_))
    }
}

impl From<&CommandResult> for Notice {
    fn from(result: &CommandResult) -> Self {
        match result {
            Ok(event) => Notice::Event(event.clone()),
            Err(rejection) => Notice::Rejected(rejection.clone()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Event(event) => fmt::Display::fmt(event, f),
            Notice::Rejected(rejection) => fmt::Display::fmt(rejection, f),
        }
    }
}
