use std::{
    collections::HashMap,
    ffi::{CString, OsStr},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use inotify::{EventMask, Inotify, WatchDescriptor, WatchMask};
use log::debug;

const WAIT_MOVE_US: u64 = 500 * 1000;
const RECREATE_DEFAULT_PERM: libc::mode_t = 0o644;

/// 被监控文件发生的变化
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub path: PathBuf,
    pub mask: EventMask,
}

/// 监控配置文件，文件被替换（编辑器保存、mv）后自动重新挂载监控
pub struct FileWatcher {
    inotify: Inotify,
    watches: HashMap<WatchDescriptor, (PathBuf, WatchMask)>,
}

impl FileWatcher {
    pub fn new() -> Result<Self> {
        let inotify = Inotify::init().context("Failed to initialize inotify")?;

        Ok(Self {
            inotify,
            watches: HashMap::new(),
        })
    }

    pub fn add<P: AsRef<Path>>(&mut self, path: P, mask: WatchMask) -> Result<()> {
        let path = path.as_ref();
        let mask = mask | WatchMask::DELETE_SELF | WatchMask::MOVE_SELF;

        let wd = self
            .inotify
            .watches()
            .add(path, mask)
            .with_context(|| format!("Failed to add watch for: {}", path.display()))?;

        self.watches.insert(wd, (path.to_path_buf(), mask));
        Ok(())
    }

    /// 用新的 inotify 实例重新挂载所有监控，文件缺失时返回错误且保留原状态
    pub fn reset(&mut self) -> Result<()> {
        let targets: Vec<(PathBuf, WatchMask)> = self.watches.values().cloned().collect();

        let mut fresh = Self::new()?;
        for (path, mask) in targets {
            fresh.add(&path, mask)?;
        }

        *self = fresh;
        Ok(())
    }

    /// 阻塞直到有事件发生
    pub fn wait(&mut self) -> Result<Vec<FileEvent>> {
        let mut buffer = [0; 4096];
        let events = self
            .inotify
            .read_events_blocking(&mut buffer)
            .context("Failed to read inotify events")?;

        let collected = Self::collect(&self.watches, events);
        self.rewatch(&collected)?;
        Ok(collected)
    }

    fn collect<'a, I>(
        watches: &HashMap<WatchDescriptor, (PathBuf, WatchMask)>,
        events: I,
    ) -> Vec<FileEvent>
    where
        I: IntoIterator<Item = inotify::Event<&'a OsStr>>,
    {
        events
            .into_iter()
            .filter_map(|event| {
                watches.get(&event.wd).map(|(path, _)| FileEvent {
                    path: path.clone(),
                    mask: event.mask,
                })
            })
            .collect()
    }

    fn rewatch(&mut self, events: &[FileEvent]) -> Result<()> {
        let gone: Vec<(WatchDescriptor, PathBuf, WatchMask)> = self
            .watches
            .iter()
            .filter(|(_, (path, _))| {
                events.iter().any(|e| {
                    &e.path == path
                        && (e.mask.contains(EventMask::IGNORED)
                            || e.mask.contains(EventMask::DELETE_SELF)
                            || e.mask.contains(EventMask::MOVE_SELF))
                })
            })
            .map(|(wd, (path, mask))| (wd.clone(), path.clone(), *mask))
            .collect();

        for (wd, path, mask) in gone {
            wait_for_path(&path);
            debug!("Re-adding watch for: {}", path.display());

            let new_wd = self
                .inotify
                .watches()
                .add(&path, mask)
                .with_context(|| format!("Failed to re-add watch for: {}", path.display()))?;

            self.watches.remove(&wd);
            self.watches.insert(new_wd, (path, mask));
        }

        Ok(())
    }
}

fn wait_for_path(path: &Path) {
    if path.exists() {
        return;
    }

    // 等待重命名完成
    thread::sleep(Duration::from_micros(WAIT_MOVE_US));

    if path.exists()
        && let Some(c_path) = path.to_str().and_then(|p| CString::new(p).ok())
    {
        // 恢复被替换文件的读写权限
        unsafe {
            libc::chmod(c_path.as_ptr(), RECREATE_DEFAULT_PERM);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_reset_restores_watch_after_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "a").unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher
            .add(&path, WatchMask::CLOSE_WRITE | WatchMask::MODIFY)
            .unwrap();

        fs::remove_file(&path).unwrap();
        assert!(watcher.reset().is_err());

        fs::write(&path, "b").unwrap();
        watcher.reset().unwrap();

        fs::write(&path, "c").unwrap();
        let events = watcher.wait().unwrap();
        assert!(events.iter().any(|e| e.path == path));
    }
}
