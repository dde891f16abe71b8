use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    datasource::file_path::{
        NODE_DEBUG, NODE_VERSION, NODE_WAKELOCK_BLOCKER, NODE_WAKELOCK_BLOCKER_DEFAULT,
    },
    model::blocker::WakelockBlocker,
    utils::{
        constants::{BOEFFLA_WL_BLOCKER_VERSION, LENGTH_LIST_WL, LENGTH_LIST_WL_DEFAULT},
        file_operate::{check_read_simple, read_node, write_node_safe},
    },
};

const SMALL_NODE_LEN: usize = 32;

/// 内核 blocker 的文本节点
#[derive(Debug, Clone)]
pub struct KernelNodes {
    root: PathBuf,
    kernel_version: Option<String>,
}

impl KernelNodes {
    /// 检查节点是否存在并读取内核版本
    pub fn probe<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let version_node = root.join(NODE_VERSION);

        let kernel_version = if check_read_simple(&version_node) {
            match read_node(&version_node, SMALL_NODE_LEN) {
                Ok(v) => Some(v.trim().to_string()),
                Err(e) => {
                    warn!("Failed to read kernel blocker version: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        let nodes = Self {
            root,
            kernel_version,
        };

        match nodes.kernel_version.as_deref() {
            Some(v) if v == BOEFFLA_WL_BLOCKER_VERSION => {
                info!("Kernel wakelock blocker found, version {v}");
            }
            Some(v) => warn!(
                "Kernel wakelock blocker version {v} differs from supported {BOEFFLA_WL_BLOCKER_VERSION}"
            ),
            None => warn!(
                "Kernel wakelock blocker not found at {}, running in dry mode",
                nodes.root.display()
            ),
        }

        nodes
    }

    pub fn is_available(&self) -> bool {
        self.kernel_version.is_some()
    }

    pub fn kernel_version(&self) -> Option<&str> {
        self.kernel_version.as_deref()
    }

    fn node(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// 把用户态状态写入内核
    pub fn push(&self, blocker: &WakelockBlocker) -> Result<()> {
        if !self.is_available() {
            debug!("Kernel blocker unavailable, skip push");
            return Ok(());
        }

        let user = blocker.show_user_list();
        let default = blocker.show_default_list();
        let debug_flag = if blocker.is_debug() { "1\n" } else { "0\n" };

        // 默认列表先写，用户列表写入时内核会重建搜索串
        write_node_safe(
            self.node(NODE_WAKELOCK_BLOCKER_DEFAULT),
            default,
            LENGTH_LIST_WL_DEFAULT,
        )?;
        write_node_safe(self.node(NODE_WAKELOCK_BLOCKER), user, LENGTH_LIST_WL)?;
        write_node_safe(self.node(NODE_DEBUG), debug_flag, SMALL_NODE_LEN)?;

        debug!("Pushed blocker state to {}", self.root.display());
        Ok(())
    }

    /// 读取内核当前的状态
    pub fn pull(&self) -> Result<WakelockBlocker> {
        let mut blocker = WakelockBlocker::new();

        let default = read_node(self.node(NODE_WAKELOCK_BLOCKER_DEFAULT), LENGTH_LIST_WL_DEFAULT)
            .context("Failed to read default wakelock list")?;
        blocker.store_default_list(&default)?;

        let user = read_node(self.node(NODE_WAKELOCK_BLOCKER), LENGTH_LIST_WL)
            .context("Failed to read user wakelock list")?;
        blocker.store_user_list(&user)?;

        let debug_status = read_node(self.node(NODE_DEBUG), SMALL_NODE_LEN)
            .context("Failed to read debug status")?;
        blocker.store_debug(parse_debug_status(&debug_status))?;

        Ok(blocker)
    }
}

// 内核输出 "Debug status: N"
fn parse_debug_status(raw: &str) -> &str {
    raw.trim().rsplit(':').next().unwrap_or("").trim()
}
