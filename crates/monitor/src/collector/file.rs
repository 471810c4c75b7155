//! 파일 기반 로그 수집기
//!
//! 로그 파일을 감시하며 새로운 라인이 추가되면 수집합니다.
//! `tail -f`와 유사한 동작을 비동기 방식으로 구현합니다.
//!
//! # 로테이션 감지
//! - inode 변경 감지 (logrotate 등, Unix 전용)
//! - 파일 크기 축소 감지 (truncation)
//! - 사라진 파일은 다음 폴링에서 재시도

use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{CollectorStatus, RawLine};
use crate::error::MonitorError;

/// 파일 수집기 설정
#[derive(Debug, Clone)]
pub struct FileTailerConfig {
    /// 감시할 파일 경로
    pub path: PathBuf,
    /// 파일 상태 체크 주기 (밀리초)
    pub poll_interval_ms: u64,
    /// 시작 시 기존 파일 내용을 처음부터 읽을지 여부
    pub read_existing: bool,
    /// 최대 라인 길이 (바이트). 초과 라인은 버립니다.
    pub max_line_length: usize,
}

impl Default for FileTailerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/tmp/access.log"),
            poll_interval_ms: 250,
            read_existing: true,
            max_line_length: 64 * 1024, // 64KB
        }
    }
}

/// 파일 기반 로그 수집기
///
/// 지정된 파일을 주기적으로 폴링하여 마지막 오프셋 이후의 라인을
/// 수집합니다. 라인은 정확히 한 번씩만 전달됩니다 (같은 바이트 범위를
/// 다시 읽지 않음). 개행으로 끝나지 않은 마지막 라인은 다음 폴링까지
/// 보류합니다.
pub struct FileTailer {
    /// 수집기 설정
    config: FileTailerConfig,
    /// 수집된 라인 전송 채널
    tx: mpsc::Sender<RawLine>,
    /// 수집 소스 식별자
    source: String,
    /// 마지막 읽기 위치 (바이트 오프셋)
    offset: u64,
    /// 현재 파일의 inode (Unix 전용)
    #[cfg(unix)]
    inode: Option<u64>,
    /// 개행을 기다리는 미완성 라인 버퍼
    partial: Vec<u8>,
    /// 현재 상태
    status: CollectorStatus,
}

impl FileTailer {
    /// 새 파일 수집기를 생성합니다.
    pub fn new(config: FileTailerConfig, tx: mpsc::Sender<RawLine>) -> Self {
        let source = format!("file:{}", config.path.display());
        Self {
            config,
            tx,
            source,
            offset: 0,
            #[cfg(unix)]
            inode: None,
            partial: Vec::new(),
            status: CollectorStatus::Idle,
        }
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> &CollectorStatus {
        &self.status
    }

    /// 수집기를 시작합니다.
    ///
    /// 취소 토큰이 취소될 때까지 실행됩니다.
    /// `tokio::spawn`으로 별도 태스크에서 호출하세요.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), MonitorError> {
        self.initialize().await;
        self.status = CollectorStatus::Running;

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(source = %self.source, "file tailer stopping");
                    self.status = CollectorStatus::Stopped;
                    return Ok(());
                }
                _ = interval.tick() => {
                    match self.poll_file().await {
                        Ok(()) => {}
                        Err(MonitorError::Channel(msg)) => {
                            // 수신측이 닫히면 더 이상 수집할 이유가 없음
                            self.status = CollectorStatus::Error(msg.clone());
                            return Err(MonitorError::Channel(msg));
                        }
                        Err(e) => {
                            tracing::warn!(
                                source = %self.source,
                                error = %e,
                                "log file poll failed, will retry"
                            );
                        }
                    }
                }
            }
        }
    }

    /// 시작 오프셋을 결정합니다.
    ///
    /// `read_existing`이 꺼져 있으면 기존 내용을 건너뛰고
    /// 현재 파일 끝에서부터 follow합니다.
    async fn initialize(&mut self) {
        if self.config.read_existing {
            return;
        }
        if let Ok(meta) = tokio::fs::metadata(&self.config.path).await {
            self.offset = meta.len();
            #[cfg(unix)]
            {
                use std::os::unix::fs::MetadataExt;
                self.inode = Some(meta.ino());
            }
        }
    }

    /// 파일을 한 번 폴링하여 새 라인을 읽고 전송합니다.
    async fn poll_file(&mut self) -> Result<(), MonitorError> {
        let meta = match tokio::fs::metadata(&self.config.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 로테이션 도중 파일이 잠시 사라질 수 있음 -- 다음 폴링에서 재시도
                self.offset = 0;
                self.partial.clear();
                #[cfg(unix)]
                {
                    self.inode = None;
                }
                return Ok(());
            }
            Err(e) => return Err(MonitorError::Io(e)),
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let current_inode = meta.ino();
            if let Some(saved) = self.inode
                && saved != current_inode
            {
                tracing::info!(source = %self.source, "log file rotated, reading from start");
                self.offset = 0;
                self.partial.clear();
            }
            self.inode = Some(current_inode);
        }

        if meta.len() < self.offset {
            tracing::info!(source = %self.source, "log file truncated, reading from start");
            self.offset = 0;
            self.partial.clear();
        }

        if meta.len() == self.offset {
            return Ok(());
        }

        let mut file = File::open(&self.config.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;

        let to_read = meta.len() - self.offset;
        let mut buf = Vec::new();
        let read = (&mut file).take(to_read).read_to_end(&mut buf).await?;
        self.offset += read as u64;

        self.partial.extend_from_slice(&buf);
        self.flush_complete_lines().await
    }

    /// 버퍼에서 완성된 라인을 잘라 채널로 전송합니다.
    async fn flush_complete_lines(&mut self) -> Result<(), MonitorError> {
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.partial.drain(..=pos).collect();
            line.pop(); // '\n' 제거
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if line.len() > self.config.max_line_length {
                tracing::warn!(
                    source = %self.source,
                    length = line.len(),
                    "dropping oversized log line"
                );
                continue;
            }

            let raw = RawLine::new(Bytes::from(line), self.source.clone());
            self.tx
                .send(raw)
                .await
                .map_err(|_| MonitorError::Channel("raw line receiver closed".to_owned()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tailer_for(
        path: PathBuf,
        read_existing: bool,
    ) -> (FileTailer, mpsc::Receiver<RawLine>) {
        let (tx, rx) = mpsc::channel(64);
        let config = FileTailerConfig {
            path,
            poll_interval_ms: 10,
            read_existing,
            ..Default::default()
        };
        (FileTailer::new(config, tx), rx)
    }

    fn text(raw: &RawLine) -> String {
        String::from_utf8_lossy(&raw.data).into_owned()
    }

    #[tokio::test]
    async fn reads_existing_lines_on_first_poll() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path, true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();

        assert_eq!(text(&rx.try_recv().unwrap()), "line one");
        assert_eq!(text(&rx.try_recv().unwrap()), "line two");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn picks_up_appended_lines_without_rereading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "first\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path.clone(), true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "first");

        // 추가된 라인만 새로 전달되어야 한다 (중복 전달 금지)
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("second\n");
        std::fs::write(&path, content).unwrap();

        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "second");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn holds_partial_line_until_newline_arrives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "incomple").unwrap();

        let (mut tailer, mut rx) = tailer_for(path.clone(), true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert!(rx.try_recv().is_err());

        std::fs::write(&path, "incomplete line\n").unwrap();
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "incomplete line");
    }

    #[tokio::test]
    async fn truncation_resets_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "old line that is fairly long\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path.clone(), true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "old line that is fairly long");

        // 파일이 더 짧은 내용으로 교체됨 (truncation)
        std::fs::write(&path, "new\n").unwrap();
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "new");
    }

    #[tokio::test]
    async fn skip_existing_starts_at_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "backlog line\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path.clone(), false);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert!(rx.try_recv().is_err());

        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("fresh line\n");
        std::fs::write(&path, content).unwrap();
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "fresh line");
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist-yet.log");

        let (mut tailer, mut rx) = tailer_for(path.clone(), true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert!(rx.try_recv().is_err());

        // 파일이 나타나면 다음 폴링부터 수집
        std::fs::write(&path, "appeared\n").unwrap();
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "appeared");
    }

    #[tokio::test]
    async fn empty_lines_are_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "\n\nreal line\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path, true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();

        // 빈 라인도 전달된다 -- 파서가 EmptyInput으로 걸러냄
        assert_eq!(text(&rx.try_recv().unwrap()), "");
        assert_eq!(text(&rx.try_recv().unwrap()), "");
        assert_eq!(text(&rx.try_recv().unwrap()), "real line");
    }

    #[tokio::test]
    async fn crlf_line_endings_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "windows line\r\n").unwrap();

        let (mut tailer, mut rx) = tailer_for(path, true);
        tailer.initialize().await;
        tailer.poll_file().await.unwrap();
        assert_eq!(text(&rx.try_recv().unwrap()), "windows line");
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "line\n").unwrap();

        let (tailer, mut rx) = tailer_for(path, true);
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut tailer = tailer;
            tailer.run(token).await
        });

        // 첫 폴링이 지나갈 시간을 준 뒤 취소
        let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("should receive within timeout");
        assert!(received.is_some());

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("should stop within timeout")
            .expect("task should not panic");
        assert!(result.is_ok());
    }
}
