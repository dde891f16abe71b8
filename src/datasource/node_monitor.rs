use std::{path::Path, thread, time::Duration};

use anyhow::{Result, anyhow};
use inotify::WatchMask;
use log::{debug, error, info, warn};

use crate::{
    datasource::{config_parser::config_read, file_path::CONF_THREAD},
    model::{blocker::SharedBlocker, kernel_node::KernelNodes},
    utils::{
        constants::monitor::{CONFIG_RELOAD_DELAY_MS, INOTIFY_RETRY_SECS},
        inotify::FileWatcher,
    },
};

/// 重新读取配置并写入内核，配置无效时保留原状态
pub fn reload_config(config_file: &Path, blocker: &SharedBlocker, nodes: &KernelNodes) -> Result<()> {
    let config = config_read(config_file)?;

    // 先在副本上应用，成功后再替换
    let snapshot = {
        let mut guard = blocker
            .lock()
            .map_err(|_| anyhow!("Wakelock blocker lock poisoned"))?;
        let mut next = guard.clone();
        config.apply_to(&mut next)?;
        *guard = next.clone();
        next
    };

    nodes.push(&snapshot)?;
    info!(
        "Blocker updated: active={}, user=[{}]",
        snapshot.is_active(),
        snapshot.show_user_list().trim()
    );
    Ok(())
}

pub fn monitor_config(config_file: &Path, blocker: SharedBlocker, nodes: KernelNodes) -> Result<()> {
    info!("{CONF_THREAD} Start");
    info!("Using Config: {}", config_file.display());

    let mut watcher = FileWatcher::new()?;
    watcher.add(config_file, WatchMask::CLOSE_WRITE | WatchMask::MODIFY)?;

    loop {
        match watcher.wait() {
            Ok(events) => debug!("Config events: {events:?}"),
            Err(e) => {
                // 配置被删除或替换，等文件重新出现后再挂载监控
                warn!("Inotify error in config monitor: {e:#}");
                thread::sleep(Duration::from_secs(INOTIFY_RETRY_SECS));
                while let Err(e) = watcher.reset() {
                    debug!("Config watch not restored yet: {e:#}");
                    thread::sleep(Duration::from_secs(INOTIFY_RETRY_SECS));
                }
                info!("Config watch restored: {}", config_file.display());
            }
        }

        // 等待写入完成
        thread::sleep(Duration::from_millis(CONFIG_RELOAD_DELAY_MS));

        if let Err(e) = reload_config(config_file, &blocker, &nodes) {
            error!("Reload config FAILED, keeping previous state: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::blocker::WakelockBlocker;

    #[test]
    fn test_reload_updates_shared_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "[blocker]\nwakelocks = [\"NETLINK\"]\n").unwrap();

        let blocker = WakelockBlocker::new().shared();
        let nodes = KernelNodes::probe(dir.path().join("no_kernel"));
        reload_config(&config, &blocker, &nodes).unwrap();
        assert!(blocker.lock().unwrap().check_for_block("NETLINK"));
    }

    #[test]
    fn test_broken_config_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "[blocker]\nwakelocks = [\"NETLINK\"]\n").unwrap();

        let blocker = WakelockBlocker::new().shared();
        let nodes = KernelNodes::probe(dir.path().join("no_kernel"));
        reload_config(&config, &blocker, &nodes).unwrap();

        fs::write(&config, "[blocker]\nwakelocks = [\"bad name\"]\n").unwrap();
        assert!(reload_config(&config, &blocker, &nodes).is_err());
        assert!(blocker.lock().unwrap().check_for_block("NETLINK"));
    }
}
