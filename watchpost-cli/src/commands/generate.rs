//! `watchpost generate` -- write synthetic access log lines.

use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use watchpost_core::config::WatchpostConfig;
use watchpost_monitor::{GeneratorConfig, LogGenerator};

use crate::cli::GenerateArgs;

pub async fn run(args: GenerateArgs, config: WatchpostConfig) -> Result<()> {
    if args.rate == 0 {
        anyhow::bail!("rate must be greater than 0");
    }

    let target = args
        .file
        .unwrap_or_else(|| config.monitor.log_file_path.clone());

    println!(
        "Writing {} lines/sec to {} (Ctrl-C to quit)",
        args.rate, target,
    );

    let mut generator = LogGenerator::new(GeneratorConfig {
        target_path: PathBuf::from(&target),
        lines_per_second: args.rate,
    });

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move { generator.run(token).await });

    tokio::signal::ctrl_c().await?;
    println!();
    cancel.cancel();

    handle
        .await
        .map_err(|e| anyhow::anyhow!("generator task panicked: {}", e))?
        .map_err(|e| anyhow::anyhow!("generator failed: {}", e))?;
    Ok(())
}
