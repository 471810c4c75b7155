//! 합성 액세스 로그 생성기 -- 데모 및 부하 테스트용
//!
//! 고정된 값 풀에서 무작위로 조합한 문법 준수 라인을
//! 매초 `lines_per_second`개씩 대상 파일에 덧붙입니다.
//! 생성된 라인은 항상 [`AccessLogParser`](crate::parser::AccessLogParser)로
//! 다시 파싱 가능합니다.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::MonitorError;

/// 생성 라인의 타임스탬프 형식 (항상 UTC)
const LINE_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S +0000";

const HTTP_VERBS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
const USERS: [&str; 5] = ["james", "jill", "frank", "patrick", "lucy"];
const SECTIONS: [&str; 5] = ["api", "admin", "account", "user", "config"];
const SUBSECTIONS: [&str; 5] = ["", "/user", "/widget", "/search", "/update"];
/// 200이 더 자주 나오도록 가중치를 둔 상태 코드 풀
const STATUS_CODES: [u16; 7] = [200, 200, 201, 401, 403, 500, 503];

/// 생성기 설정
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// 라인을 덧붙일 대상 파일
    pub target_path: PathBuf,
    /// 초당 생성 라인 수
    pub lines_per_second: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_path: PathBuf::from("/tmp/access.log"),
            lines_per_second: 10,
        }
    }
}

/// 합성 액세스 로그 생성기
pub struct LogGenerator {
    /// 생성기 설정
    config: GeneratorConfig,
    /// 지금까지 기록한 라인 수
    lines_written: u64,
}

impl LogGenerator {
    /// 새 생성기를 생성합니다.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            lines_written: 0,
        }
    }

    /// 지금까지 기록한 라인 수를 반환합니다.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// 문법 준수 라인 하나를 생성합니다.
    pub fn generate_line(now: DateTime<Utc>) -> String {
        let mut rng = rand::rng();
        let verb = HTTP_VERBS[rng.random_range(0..HTTP_VERBS.len())];
        let user = USERS[rng.random_range(0..USERS.len())];
        let section = SECTIONS[rng.random_range(0..SECTIONS.len())];
        let subsection = SUBSECTIONS[rng.random_range(0..SUBSECTIONS.len())];
        let status = STATUS_CODES[rng.random_range(0..STATUS_CODES.len())];
        let byte_size: u32 = rng.random_range(100..500);

        format!(
            "127.0.0.1 - {user} [{timestamp}] \"{verb} /{section}{subsection} HTTP/1.0\" {status} {byte_size}",
            timestamp = now.format(LINE_TIMESTAMP_FORMAT),
        )
    }

    /// 생성기를 시작합니다.
    ///
    /// 취소 토큰이 취소될 때까지 매초 한 배치를 기록합니다.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), MonitorError> {
        tracing::info!(
            target = %self.config.target_path.display(),
            rate = self.config.lines_per_second,
            "log generator starting"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(written = self.lines_written, "log generator stopping");
                    return Ok(());
                }
                _ = interval.tick() => {
                    self.write_batch().await?;
                }
            }
        }
    }

    /// 한 배치(`lines_per_second`개의 라인)를 기록합니다.
    async fn write_batch(&mut self) -> Result<(), MonitorError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.config.target_path)
            .await?;

        let now = Utc::now();
        let mut batch = String::new();
        for _ in 0..self.config.lines_per_second {
            batch.push_str(&Self::generate_line(now));
            batch.push('\n');
        }

        file.write_all(batch.as_bytes()).await?;
        file.flush().await?;

        self.lines_written += u64::from(self.config.lines_per_second);
        tracing::debug!(
            written = self.lines_written,
            "wrote synthetic log batch"
        );
        Ok(())
    }
}
