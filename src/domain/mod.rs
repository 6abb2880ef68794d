// Domain layer: bench models, notices and ports. No runtime or I/O dependencies.

pub mod events;
pub mod model;
pub mod ports;
