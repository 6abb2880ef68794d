use clap::Parser;
use std::sync::Arc;
use titration_lab::utils::error::ErrorSeverity;
use titration_lab::utils::{logger, validation::Validate};
use titration_lab::{BenchShell, CliConfig, EventLog, LabBench, LabError};
use tokio::io::BufReader;

fn exit_with(e: &LabError) -> ! {
    tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🧪 Starting titration-lab");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_lab_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }
    tracing::debug!("Lab config: {:?}", config);

    let log = Arc::new(EventLog::new());
    let bench = LabBench::new(config, log.clone());

    if cli.follow {
        let mut readouts = bench.subscribe();
        tokio::spawn(async move {
            while readouts.changed().await.is_ok() {
                let current = readouts.borrow_and_update().clone();
                println!("  {}", current);
            }
        });
    }

    let mut shell = BenchShell::new(bench, log, std::io::stdout());

    let outcome = match &cli.script {
        Some(path) => {
            tracing::info!("📁 Running bench script: {}", path.display());
            match tokio::fs::File::open(path).await {
                Ok(file) => shell.run(BufReader::new(file)).await,
                Err(e) => Err(LabError::IoError(e)),
            }
        }
        None => {
            println!("Titration bench ready. Type 'help' for commands.");
            shell.run(BufReader::new(tokio::io::stdin())).await
        }
    };

    // 關閉工作台
    drop(shell);

    if let Err(e) = outcome {
        exit_with(&e);
    }

    tracing::info!("✅ Bench closed");
    Ok(())
}
