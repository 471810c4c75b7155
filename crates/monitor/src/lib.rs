#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`collector`]: 로그 파일 follow 수집기 (`tail -f` 방식, 로테이션 감지)
//! - [`parser`]: 액세스 로그 문법 파서
//! - [`store`]: append-only 이벤트 저장소 및 트레일링 윈도우 질의
//! - [`stats`]: 섹션별 히트/에러 집계
//! - [`alert`]: 히스테리시스 알림 상태 기계
//! - [`generator`]: 합성 액세스 로그 생성기 (데모/테스트용)
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션 (Pipeline trait 구현)
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileTailer -> mpsc -> Parser -> EventStore
//!                                     |
//!                    tick -> trailing_window -> AlertStateMachine -> notifications
//!                                          \-> group_by_section -> stats snapshot
//! ```

pub mod alert;
pub mod collector;
pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod store;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{MonitorPipeline, MonitorPipelineBuilder, StatsSnapshot};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::MonitorError;

// 파서
pub use parser::AccessLogParser;

// 저장소
pub use store::EventStore;

// 알림
pub use alert::{AlertKind, AlertNotification, AlertStateMachine};

// 수집기
pub use collector::{CollectorStatus, FileTailer, RawLine};

// 생성기
pub use generator::{GeneratorConfig, LogGenerator};
