use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;

use crate::datasource::file_path::LOG_LEVEL_PATH;

// 控制台日志
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        // 过滤由 max_level 完成
        true
    }

    fn log(&self, record: &Record) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        println!("[{}][{}]: {}", timestamp, record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: Lazy<ConsoleLogger> = Lazy::new(|| ConsoleLogger);

pub fn init_logger() -> Result<()> {
    let log_level = read_log_level_config(LOG_LEVEL_PATH);

    log::set_logger(&*LOGGER)
        .map(|()| log::set_max_level(log_level))
        .map_err(|e| anyhow!("Failed to set logger: {e}"))?;

    log::info!("Logger initialized with level: {}", log_level);
    log::info!("Log level config path: {}", LOG_LEVEL_PATH);

    Ok(())
}

pub fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        _ => None,
    }
}

/// 读取日志等级，文件缺失或内容无效时为 Info
pub fn read_log_level_config<P: AsRef<Path>>(path: P) -> LevelFilter {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| parse_log_level(&content))
        .unwrap_or(LevelFilter::Info)
}

pub fn update_log_level() {
    let new_level = read_log_level_config(LOG_LEVEL_PATH);
    log::set_max_level(new_level);
    log::info!("Log level updated to: {}", new_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init_logger();
        let err = init_logger().unwrap_err();
        assert!(err.to_string().contains("Failed to set logger"));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug\n"), Some(LevelFilter::Debug));
        assert_eq!(parse_log_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("trace"), None);
    }

    #[test]
    fn test_missing_file_defaults_to_info() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            read_log_level_config(dir.path().join("log_level")),
            LevelFilter::Info
        );

        let path = dir.path().join("level");
        std::fs::write(&path, "error").unwrap();
        assert_eq!(read_log_level_config(&path), LevelFilter::Error);
    }
}
