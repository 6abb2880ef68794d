use crate::adapters::EventLog;
use crate::core::bench::LabBench;
use crate::utils::error::{ErrorSeverity, LabError, Result};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "\
Bench commands:
  place flask|beaker|burette   put equipment on the bench
  add sample|indicator         add 10 mL HCl or phenolphthalein to the vessel
  drop <item>                  drop any item by name (chem-hcl, chem-indicator, ...)
  valve [open|close]           open/close the burette (no argument toggles)
  wait <seconds>               let time pass
  status [--json]              show the readouts
  log                          show the full bench log
  reset                        clear the bench
  help                         show this text
  quit                         leave the lab";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveAction {
    Toggle,
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Drop(String),
    Valve(ValveAction),
    Wait(Duration),
    Status { json: bool },
    Log,
    Reset,
    Help,
    Quit,
}

fn parse_error(input: &str, reason: impl Into<String>) -> LabError {
    LabError::CommandParseError {
        input: input.to_string(),
        reason: reason.into(),
    }
}

impl ShellCommand {
    /// Parses one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let mut words = trimmed.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("place" | "add" | "drop", [item]) => ShellCommand::Drop(item.to_string()),
            ("place" | "add" | "drop", _) => {
                return Err(parse_error(trimmed, "expected exactly one item name"))
            }
            ("valve", []) => ShellCommand::Valve(ValveAction::Toggle),
            ("valve", ["open"]) => ShellCommand::Valve(ValveAction::Open),
            ("valve", ["close"]) => ShellCommand::Valve(ValveAction::Close),
            ("valve", _) => return Err(parse_error(trimmed, "expected 'open' or 'close'")),
            ("wait", [seconds]) => {
                let seconds: f64 = seconds
                    .parse()
                    .map_err(|_| parse_error(trimmed, "seconds must be a number"))?;
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(parse_error(trimmed, "seconds must be zero or more"));
                }
                let duration = Duration::try_from_secs_f64(seconds)
                    .map_err(|_| parse_error(trimmed, "seconds out of range"))?;
                ShellCommand::Wait(duration)
            }
            ("wait", _) => return Err(parse_error(trimmed, "expected a number of seconds")),
            ("status", []) => ShellCommand::Status { json: false },
            ("status", ["--json"]) => ShellCommand::Status { json: true },
            ("log", []) => ShellCommand::Log,
            ("reset", []) => ShellCommand::Reset,
            ("help" | "?", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            _ => return Err(parse_error(trimmed, "unknown command")),
        };

        Ok(Some(command))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Text front end for a [`LabBench`]. Bench notices are echoed as `> line`,
/// the same way the log panel shows them.
pub struct BenchShell<W: Write> {
    bench: LabBench,
    log: Arc<EventLog>,
    out: W,
    printed: usize,
}

impl<W: Write> BenchShell<W> {
    /// `log` must be the notifier `bench` was built with.
    pub fn new(bench: LabBench, log: Arc<EventLog>, out: W) -> Self {
        Self {
            bench,
            log,
            out,
            printed: 0,
        }
    }

    pub fn bench(&self) -> &LabBench {
        &self.bench
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        tracing::debug!(command = ?command, "executing bench command");

        match command {
            ShellCommand::Drop(item) => {
                let _ = self.bench.drop_item(&item).await;
            }
            ShellCommand::Valve(ValveAction::Toggle) => {
                let _ = self.bench.toggle_valve().await;
            }
            ShellCommand::Valve(ValveAction::Open) => {
                let _ = self.bench.open_valve().await;
            }
            ShellCommand::Valve(ValveAction::Close) => {
                let _ = self.bench.close_valve().await;
            }
            ShellCommand::Wait(duration) => tokio::time::sleep(duration).await,
            ShellCommand::Status { json } => {
                let readouts = self.bench.readouts().await;
                if json {
                    writeln!(self.out, "{}", serde_json::to_string(&readouts)?)?;
                } else {
                    writeln!(self.out, "{}", readouts)?;
                }
            }
            ShellCommand::Log => {
                for entry in self.log.entries() {
                    writeln!(self.out, "[{}] > {}", entry.at.format("%H:%M:%S"), entry.line)?;
                }
            }
            ShellCommand::Reset => {
                self.bench.reset().await;
            }
            ShellCommand::Help => writeln!(self.out, "{}", HELP)?,
            ShellCommand::Quit => {
                self.flush_notices()?;
                return Ok(Flow::Quit);
            }
        }

        self.flush_notices()?;
        Ok(Flow::Continue)
    }

    pub async fn execute_line(&mut self, line: &str) -> Result<Flow> {
        match ShellCommand::parse(line)? {
            Some(command) => self.execute(command).await,
            None => Ok(Flow::Continue),
        }
    }

    /// Runs commands until `quit` or end of input. Unparseable lines are
    /// reported and skipped.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<()> {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            match self.execute_line(&line).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) if e.severity() == ErrorSeverity::Low => {
                    tracing::warn!("{}", e);
                    writeln!(self.out, "! {}", e.user_friendly_message())?;
                }
                Err(e) => return Err(e),
            }
        }
        self.flush_notices()?;
        Ok(())
    }

    fn flush_notices(&mut self) -> Result<()> {
        let fresh = self.log.entries_since(self.printed);
        self.printed += fresh.len();
        for entry in fresh {
            writeln!(self.out, "> {}", entry.line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
