pub mod toml_config;

pub use toml_config::{DripConfig, LabConfig, ReagentConfig, VesselConfig};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "titration-lab")]
#[command(about = "Acid-base titration bench simulator")]
pub struct CliConfig {
    /// Path to a TOML lab configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run bench commands from a file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Override the drip interval from the config (milliseconds)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Print readouts every time they change
    #[arg(long)]
    pub follow: bool,

    /// Emit diagnostics as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入配置並套用命令列覆蓋
    pub fn load_lab_config(&self) -> crate::utils::error::Result<LabConfig> {
        let mut config = match &self.config {
            Some(path) => LabConfig::from_file(path)?,
            None => LabConfig::default(),
        };

        if let Some(interval_ms) = self.interval_ms {
            config.drip.interval_ms = interval_ms;
            tracing::info!("🔧 Drip interval overridden to {} ms", interval_ms);
        }

        Ok(config)
    }
}
