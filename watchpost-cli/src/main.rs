use std::path::Path;

use anyhow::Result;
use clap::Parser;

use watchpost_core::config::WatchpostConfig;

use crate::cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli).await?;
    logging::init_tracing(&config.general)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "watchpost starting");

    match cli.command {
        Commands::Watch(args) => commands::watch::run(args, config).await,
        Commands::Generate(args) => commands::generate::run(args, config).await,
    }
}

/// 설정을 로드하고 CLI 오버라이드를 적용합니다.
///
/// `--config`로 명시된 파일이 없으면 치명적 에러입니다.
/// 경로가 생략된 경우 `./watchpost.toml`이 있으면 사용하고,
/// 없으면 기본값에 환경변수 오버라이드만 적용합니다.
async fn resolve_config(cli: &Cli) -> Result<WatchpostConfig> {
    let mut config = match &cli.config {
        Some(path) => WatchpostConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?,
        None => {
            let default_path = Path::new("watchpost.toml");
            if default_path.exists() {
                WatchpostConfig::load(default_path)
                    .await
                    .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?
            } else {
                let mut config = WatchpostConfig::default();
                config.apply_env_overrides();
                config
            }
        }
    };

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}
