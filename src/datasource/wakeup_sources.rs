use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::model::blocker::WakelockBlocker;

// name 之后的数值列数
const NUMERIC_COLUMNS: usize = 9;

/// wakeup_sources 中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeupSource {
    pub name: String,
    pub active_count: u64,
    pub total_time_ms: u64,
    pub prevent_suspend_time_ms: u64,
}

pub fn parse_wakeup_sources(content: &str) -> Vec<WakeupSource> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() <= NUMERIC_COLUMNS {
                debug!("Skipping malformed wakeup source line: {line}");
                return None;
            }

            // 名称可能含空格，数值列从右侧取
            let split = fields.len() - NUMERIC_COLUMNS;
            let numbers = &fields[split..];
            let value = |i: usize| numbers[i].parse::<u64>().ok();

            Some(WakeupSource {
                name: fields[..split].join(" "),
                active_count: value(0)?,
                total_time_ms: value(5)?,
                prevent_suspend_time_ms: value(8)?,
            })
        })
        .collect()
}

pub fn read_wakeup_sources<P: AsRef<Path>>(path: P) -> Result<Vec<WakeupSource>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read wakeup sources: {}", path.display()))?;
    Ok(parse_wakeup_sources(&content))
}

/// 按总持有时间排序，标记会被屏蔽的来源
pub fn blocked_report<'a>(
    sources: &'a [WakeupSource],
    blocker: &WakelockBlocker,
) -> Vec<(&'a WakeupSource, bool)> {
    let mut report: Vec<(&WakeupSource, bool)> = sources
        .iter()
        .map(|s| (s, blocker.check_for_block(&s.name)))
        .collect();
    report.sort_by(|a, b| b.0.total_time_ms.cmp(&a.0.total_time_ms));
    report
}
