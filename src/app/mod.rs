pub mod shell;

pub use shell::{BenchShell, Flow, ShellCommand, ValveAction};
