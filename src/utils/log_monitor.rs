use std::{fs, path::Path, thread, time::Duration};

use anyhow::{Context, Result};
use inotify::WatchMask;
use log::{debug, info, warn};

use crate::{
    datasource::file_path::{LOG_LEVEL_PATH, LOG_LEVEL_THREAD},
    utils::{
        constants::monitor::INOTIFY_RETRY_SECS, file_operate::check_read_simple,
        inotify::FileWatcher, logger::update_log_level,
    },
};

pub fn monitor_log_level() -> Result<()> {
    info!("{LOG_LEVEL_THREAD} Start");

    let path = Path::new(LOG_LEVEL_PATH);
    if !check_read_simple(path) {
        // 需要文件存在才能挂载监控
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log dir: {}", parent.display()))?;
        }
        fs::write(path, "info\n")
            .with_context(|| format!("Failed to create log level file: {LOG_LEVEL_PATH}"))?;
        info!("Created log level file: {LOG_LEVEL_PATH}");
    } else {
        info!("Using log level path: {LOG_LEVEL_PATH}");
    }

    let mut watcher = FileWatcher::new()?;
    watcher.add(path, WatchMask::CLOSE_WRITE | WatchMask::MODIFY)?;

    loop {
        if let Err(e) = watcher.wait() {
            warn!("Inotify error in log level monitor: {e:#}");
            thread::sleep(Duration::from_secs(INOTIFY_RETRY_SECS));
            while let Err(e) = watcher.reset() {
                debug!("Log level watch not restored yet: {e:#}");
                thread::sleep(Duration::from_secs(INOTIFY_RETRY_SECS));
            }
            continue;
        }

        if !check_read_simple(path) {
            debug!("Log level file no longer exists");
            continue;
        }

        update_log_level();
    }
}
