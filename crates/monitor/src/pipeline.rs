//! 파이프라인 오케스트레이션 -- 수집/파싱/통계/알림의 전체 흐름을 관리합니다.
//!
//! [`MonitorPipeline`]은 core의 [`Pipeline`](watchpost_core::pipeline::Pipeline)
//! trait을 구현합니다.
//!
//! # 내부 아키텍처
//! ```text
//! FileTailer -> mpsc -> ingest loop (단일 태스크)
//!                         |- 라인 파싱 -> EventStore.append
//!                         |- tick마다:
//!                         |    trailing_window -> AlertStateMachine -> alert mpsc
//!                         |    group_by_section -> StatsSnapshot -> watch
//! ```
//!
//! 저장소와 상태 기계를 하나의 태스크가 소유하므로 별도의 잠금 없이
//! 쓰기(append)와 읽기(윈도우 질의)가 상호 배제됩니다.
//! tick 드라이버도 이 태스크 하나뿐입니다.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use watchpost_core::error::{ParseError, PipelineError, WatchpostError};
use watchpost_core::pipeline::{HealthStatus, Pipeline};
use watchpost_core::types::{AlertState, SectionDetail};

use crate::alert::{AlertNotification, AlertStateMachine};
use crate::collector::{FileTailer, FileTailerConfig, RawLine};
use crate::config::PipelineConfig;
use crate::error::MonitorError;
use crate::parser::AccessLogParser;
use crate::stats;
use crate::store::EventStore;

/// 알림 채널 용량
const ALERT_CHANNEL_CAPACITY: usize = 256;

/// 파이프라인 실행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 정지됨
    Stopped,
}

/// 한 tick 시점의 통계 스냅샷
///
/// 라이브 뷰(트레일링 윈도우)와 전체 뷰(저장소 전체)의 섹션 테이블을
/// 모두 담습니다. 둘 다 히트 수 내림차순으로 정렬되어 있습니다.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// 스냅샷 시각
    pub taken_at: DateTime<Utc>,
    /// 저장소 전체 이벤트 수
    pub total_events: u64,
    /// 라이브 통계 윈도우 (초)
    pub stats_window_seconds: u64,
    /// 트레일링 윈도우의 섹션 테이블 (히트 내림차순)
    pub window_sections: Vec<SectionDetail>,
    /// 전체 기간 섹션 테이블 (히트 내림차순)
    pub alltime_sections: Vec<SectionDetail>,
    /// 알림 판정 윈도우의 이벤트 수
    pub alert_window_count: u64,
    /// 표시용 비율 (초당 요청 수, 소수)
    pub alert_rate: f64,
    /// 현재 알림 상태
    pub alert_state: AlertState,
}

impl StatsSnapshot {
    /// 비어있는 초기 스냅샷을 생성합니다.
    fn empty(stats_window_seconds: u64, taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            total_events: 0,
            stats_window_seconds,
            window_sections: Vec::new(),
            alltime_sections: Vec::new(),
            alert_window_count: 0,
            alert_rate: 0.0,
            alert_state: AlertState::Idle,
        }
    }
}

/// 액세스 로그 모니터 파이프라인
///
/// # 사용 예시
/// ```no_run
/// # async fn example() -> Result<(), watchpost_core::error::WatchpostError> {
/// use watchpost_core::pipeline::Pipeline;
/// use watchpost_monitor::{MonitorPipelineBuilder, PipelineConfig};
///
/// let (mut pipeline, mut alert_rx, stats_rx) = MonitorPipelineBuilder::new()
///     .config(PipelineConfig::default())
///     .build()?;
///
/// pipeline.start().await?;
/// if let Some(notification) = alert_rx.recv().await {
///     println!("{notification}");
/// }
/// pipeline.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct MonitorPipeline {
    /// 파이프라인 설정
    config: PipelineConfig,
    /// 현재 상태
    state: PipelineState,
    /// 태스크 취소 토큰
    cancel: CancellationToken,
    /// 백그라운드 태스크 핸들
    tasks: Vec<tokio::task::JoinHandle<()>>,
    /// 알림 전송 채널 (파이프라인 -> downstream)
    alert_tx: mpsc::Sender<AlertNotification>,
    /// 통계 스냅샷 채널 (start 시 수집 루프로 이동)
    stats_tx: Option<watch::Sender<StatsSnapshot>>,
    /// 저장소에 추가된 이벤트 카운터
    processed: Arc<AtomicU64>,
    /// 파싱 실패 카운터
    parse_errors: Arc<AtomicU64>,
}

impl MonitorPipeline {
    /// 현재 상태 이름을 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 저장소에 추가된 이벤트 수를 반환합니다.
    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// 파싱 실패 수를 반환합니다.
    pub fn parse_error_count(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    /// 파이프라인 설정에 대한 참조를 반환합니다.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Pipeline for MonitorPipeline {
    async fn start(&mut self) -> Result<(), WatchpostError> {
        if self.state == PipelineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }
        let stats_tx = self.stats_tx.take().ok_or_else(|| {
            WatchpostError::Pipeline(PipelineError::InitFailed(
                "pipeline cannot be restarted after stop".to_owned(),
            ))
        })?;

        tracing::info!(
            file = %self.config.log_file_path,
            threshold = self.config.alert_rate_threshold,
            window_seconds = self.config.alert_window_seconds,
            "starting monitor pipeline"
        );

        let alert_machine = AlertStateMachine::new(
            self.config.alert_rate_threshold,
            self.config.alert_window_seconds,
        )
        .map_err(WatchpostError::from)?;

        let (raw_tx, raw_rx) = mpsc::channel(self.config.channel_capacity);

        // 1. 수집기 태스크 스폰
        let tailer_config = FileTailerConfig {
            path: PathBuf::from(&self.config.log_file_path),
            poll_interval_ms: self.config.poll_interval_ms,
            read_existing: self.config.read_existing,
            ..Default::default()
        };
        let mut tailer = FileTailer::new(tailer_config, raw_tx);
        let tailer_cancel = self.cancel.child_token();
        self.tasks.push(tokio::spawn(async move {
            if let Err(e) = tailer.run(tailer_cancel).await {
                tracing::error!(error = %e, "file tailer terminated");
            }
        }));

        // 2. 수집/평가 루프 스폰
        let ingest = IngestLoop {
            config: self.config.clone(),
            raw_rx,
            parser: AccessLogParser::new(),
            store: EventStore::new(),
            alert_machine,
            stats_tx,
            alert_tx: self.alert_tx.clone(),
            processed: Arc::clone(&self.processed),
            parse_errors: Arc::clone(&self.parse_errors),
        };
        let loop_cancel = self.cancel.child_token();
        self.tasks
            .push(tokio::spawn(async move { ingest.run(loop_cancel).await }));

        self.state = PipelineState::Running;
        tracing::info!("monitor pipeline started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), WatchpostError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        tracing::info!("stopping monitor pipeline");

        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }

        self.state = PipelineState::Stopped;
        tracing::info!("monitor pipeline stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => {
                let processed = self.processed.load(Ordering::Relaxed);
                let failed = self.parse_errors.load(Ordering::Relaxed);
                if failed > 0 && processed == 0 {
                    HealthStatus::Degraded("all input lines failing to parse".to_owned())
                } else {
                    HealthStatus::Healthy
                }
            }
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 모니터 파이프라인 빌더
pub struct MonitorPipelineBuilder {
    config: PipelineConfig,
}

impl MonitorPipelineBuilder {
    /// 기본 설정으로 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 설정을 검증하고 파이프라인과 출력 채널들을 생성합니다.
    ///
    /// 반환값: (파이프라인, 알림 수신 채널, 통계 스냅샷 watch 채널)
    pub fn build(
        self,
    ) -> Result<
        (
            MonitorPipeline,
            mpsc::Receiver<AlertNotification>,
            watch::Receiver<StatsSnapshot>,
        ),
        MonitorError,
    > {
        self.config.validate()?;

        let (alert_tx, alert_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);
        let (stats_tx, stats_rx) = watch::channel(StatsSnapshot::empty(
            self.config.stats_window_seconds,
            Utc::now(),
        ));

        let pipeline = MonitorPipeline {
            config: self.config,
            state: PipelineState::Initialized,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            alert_tx,
            stats_tx: Some(stats_tx),
            processed: Arc::new(AtomicU64::new(0)),
            parse_errors: Arc::new(AtomicU64::new(0)),
        };

        Ok((pipeline, alert_rx, stats_rx))
    }
}

impl Default for MonitorPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 수집/평가 루프
///
/// 저장소와 알림 상태 기계를 단독 소유하는 협력적 단일 태스크입니다.
struct IngestLoop {
    config: PipelineConfig,
    raw_rx: mpsc::Receiver<RawLine>,
    parser: AccessLogParser,
    store: EventStore,
    alert_machine: AlertStateMachine,
    stats_tx: watch::Sender<StatsSnapshot>,
    alert_tx: mpsc::Sender<AlertNotification>,
    processed: Arc<AtomicU64>,
    parse_errors: Arc<AtomicU64>,
}

impl IngestLoop {
    async fn run(mut self, cancel: CancellationToken) {
        let mut tick =
            tokio::time::interval(Duration::from_millis(self.config.refresh_interval_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("ingest loop stopping");
                    break;
                }
                maybe_line = self.raw_rx.recv() => match maybe_line {
                    Some(raw) => self.ingest(&raw),
                    None => {
                        tracing::warn!("collector channel closed, stopping ingest loop");
                        break;
                    }
                },
                _ = tick.tick() => self.evaluate(Utc::now()).await,
            }
        }
    }

    /// 원시 라인 하나를 파싱하여 저장소에 추가합니다.
    ///
    /// 파싱 실패는 라인 단위로 버려질 뿐 치명적이지 않습니다.
    /// 라인별 에러 스팸을 피하기 위해 debug 레벨로만 기록합니다.
    fn ingest(&mut self, raw: &RawLine) {
        let line = String::from_utf8_lossy(&raw.data);
        match self.parser.parse_line(&line) {
            Ok(event) => {
                self.store.append(event);
                self.processed.fetch_add(1, Ordering::Relaxed);
            }
            // 빈 라인은 기대되는 노이즈
            Err(ParseError::EmptyInput) => {}
            Err(e) => {
                self.parse_errors.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(source = %raw.source, error = %e, "dropped malformed line");
            }
        }
    }

    /// 한 번의 평가 tick: 알림 판정과 통계 스냅샷 갱신.
    async fn evaluate(&mut self, now: DateTime<Utc>) {
        let alert_count = self
            .store
            .trailing_window(now, self.config.alert_window_seconds)
            .len() as u64;

        if let Some(notification) = self.alert_machine.tick(alert_count, now) {
            tracing::info!(
                kind = ?notification.kind,
                rate = notification.rate,
                "alert notification"
            );
            if self.alert_tx.send(notification).await.is_err() {
                tracing::warn!("alert receiver dropped, notification lost");
            }
        }

        let window_events = self
            .store
            .trailing_window(now, self.config.stats_window_seconds);
        let snapshot = StatsSnapshot {
            taken_at: now,
            total_events: self.store.len() as u64,
            stats_window_seconds: self.config.stats_window_seconds,
            window_sections: stats::sort_by_hits_desc(stats::group_by_section(&window_events)),
            alltime_sections: stats::sort_by_hits_desc(stats::group_by_section(
                self.store.events(),
            )),
            alert_window_count: self.alert_machine.last_count(),
            alert_rate: self.alert_machine.last_rate(),
            alert_state: self.alert_machine.state(),
        };

        // 수신측이 없어도 최신 스냅샷 갱신은 계속한다
        let _ = self.stats_tx.send(snapshot);
    }
}
