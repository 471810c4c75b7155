//! watchpost.toml 통합 설정 테스트
//!
//! - watchpost.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use watchpost_core::config::WatchpostConfig;
use watchpost_core::error::{ConfigError, WatchpostError};

// =============================================================================
// watchpost.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../watchpost.toml.example");
    let config = WatchpostConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../watchpost.toml.example");
    let config = WatchpostConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_has_correct_monitor_defaults() {
    let content = include_str!("../../../watchpost.toml.example");
    let config = WatchpostConfig::parse(content).expect("should parse");

    assert_eq!(config.monitor.log_file_path, "/tmp/access.log");
    assert_eq!(config.monitor.alert_rate_threshold, 10);
    assert_eq!(config.monitor.alert_window_seconds, 120);
    assert_eq!(config.monitor.stats_window_seconds, 10);
    assert_eq!(config.monitor.refresh_interval_ms, 500);
    assert!(config.monitor.read_existing);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn empty_config_uses_all_defaults() {
    let config = WatchpostConfig::parse("").expect("empty config should parse");
    assert_eq!(config.monitor.alert_rate_threshold, 10);
    assert_eq!(config.monitor.alert_window_seconds, 120);
}

#[test]
fn general_only_config_keeps_monitor_defaults() {
    let config = WatchpostConfig::parse("[general]\nlog_level = \"debug\"\n")
        .expect("should parse");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.monitor.log_file_path, "/tmp/access.log");
}

#[test]
fn unknown_section_is_ignored() {
    let config = WatchpostConfig::parse("[nonexistent]\nfoo = 1\n");
    // serde 기본 동작: 알 수 없는 필드는 무시
    assert!(config.is_ok());
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_file_value() {
    let saved = std::env::var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD").ok();

    unsafe {
        std::env::set_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD", "42");
    }

    let mut config =
        WatchpostConfig::parse("[monitor]\nalert_rate_threshold = 5\n").expect("should parse");
    config.apply_env_overrides();
    assert_eq!(config.monitor.alert_rate_threshold, 42);

    unsafe {
        match saved {
            Some(val) => std::env::set_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD", val),
            None => std::env::remove_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD"),
        }
    }
}

#[test]
#[serial_test::serial]
fn env_override_log_file_path() {
    let saved = std::env::var("WATCHPOST_MONITOR_LOG_FILE_PATH").ok();

    unsafe {
        std::env::set_var("WATCHPOST_MONITOR_LOG_FILE_PATH", "/var/log/nginx/access.log");
    }

    let mut config = WatchpostConfig::default();
    config.apply_env_overrides();
    assert_eq!(config.monitor.log_file_path, "/var/log/nginx/access.log");

    unsafe {
        match saved {
            Some(val) => std::env::set_var("WATCHPOST_MONITOR_LOG_FILE_PATH", val),
            None => std::env::remove_var("WATCHPOST_MONITOR_LOG_FILE_PATH"),
        }
    }
}

#[test]
#[serial_test::serial]
fn invalid_env_value_is_ignored() {
    let saved = std::env::var("WATCHPOST_MONITOR_ALERT_WINDOW_SECONDS").ok();

    unsafe {
        std::env::set_var("WATCHPOST_MONITOR_ALERT_WINDOW_SECONDS", "not-a-number");
    }

    let mut config = WatchpostConfig::default();
    config.apply_env_overrides();
    // 파싱 불가능한 값은 무시하고 기존 값 유지
    assert_eq!(config.monitor.alert_window_seconds, 120);

    unsafe {
        match saved {
            Some(val) => std::env::set_var("WATCHPOST_MONITOR_ALERT_WINDOW_SECONDS", val),
            None => std::env::remove_var("WATCHPOST_MONITOR_ALERT_WINDOW_SECONDS"),
        }
    }
}

// =============================================================================
// 파일 로딩 에러 테스트
// =============================================================================

#[tokio::test]
async fn missing_file_returns_file_not_found() {
    let result = WatchpostConfig::from_file("/nonexistent/watchpost.toml").await;
    assert!(matches!(
        result,
        Err(WatchpostError::Config(ConfigError::FileNotFound { .. })),
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_validates_after_env_overrides() {
    let saved = std::env::var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD").ok();

    // 검증은 오버라이드 적용 이후 수행되므로, 파일 값이 유효해도
    // 환경변수가 0이면 로드가 실패해야 한다.
    unsafe {
        std::env::set_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD", "0");
    }

    let dir = std::env::temp_dir();
    let path = dir.join("watchpost-config-test.toml");
    tokio::fs::write(&path, "[monitor]\nalert_rate_threshold = 10\n")
        .await
        .expect("write temp config");

    let result = WatchpostConfig::load(&path).await;
    assert!(result.is_err());

    tokio::fs::remove_file(&path).await.ok();
    unsafe {
        match saved {
            Some(val) => std::env::set_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD", val),
            None => std::env::remove_var("WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD"),
        }
    }
}
