//! `watchpost watch` -- follow the access log and print live
//! statistics and alert notifications.

use anyhow::Result;
use tokio::time::{Duration, MissedTickBehavior, interval};

use watchpost_core::config::WatchpostConfig;
use watchpost_core::pipeline::Pipeline;
use watchpost_monitor::{MonitorPipelineBuilder, PipelineConfig};

use crate::cli::WatchArgs;
use crate::output;

pub async fn run(args: WatchArgs, config: WatchpostConfig) -> Result<()> {
    let mut pipeline_config = PipelineConfig::from_core(&config.monitor);
    if let Some(file) = &args.file {
        pipeline_config.log_file_path = file.clone();
    }
    if let Some(threshold) = args.threshold {
        pipeline_config.alert_rate_threshold = threshold;
    }
    if let Some(window) = args.window {
        pipeline_config.alert_window_seconds = window;
    }

    let (mut pipeline, mut alert_rx, stats_rx) = MonitorPipelineBuilder::new()
        .config(pipeline_config)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build monitor pipeline: {}", e))?;

    pipeline
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start monitor pipeline: {}", e))?;

    println!(
        "Watching {} (alert at {} req/s over {}s window, Ctrl-C to quit)",
        pipeline.config().log_file_path,
        pipeline.config().alert_rate_threshold,
        pipeline.config().alert_window_seconds,
    );

    let mut display = interval(Duration::from_secs(args.display_interval.max(1)));
    display.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval의 첫 tick은 즉시 발화함 -- 시작 직후의 빈 테이블은 건너뜀
    display.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break;
            }
            maybe_alert = alert_rx.recv() => match maybe_alert {
                Some(notification) => println!("{notification}"),
                None => {
                    tracing::warn!("alert channel closed, shutting down");
                    break;
                }
            },
            _ = display.tick() => {
                let snapshot = stats_rx.borrow().clone();
                if args.json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    print!("{}", output::render_snapshot(&snapshot));
                }
            }
        }
    }

    pipeline
        .stop()
        .await
        .map_err(|e| anyhow::anyhow!("failed to stop monitor pipeline: {}", e))?;
    Ok(())
}
