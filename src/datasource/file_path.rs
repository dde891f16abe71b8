// Thread names
pub const MAIN_THREAD: &str = "BlockerMain";
pub const CONF_THREAD: &str = "ConfigWatcher";
pub const LOG_LEVEL_THREAD: &str = "LogLevelWatcher";

// Kernel nodes
pub const BLOCKER_NODE_ROOT: &str = "/sys/class/misc/boeffla_wakelock_blocker";
pub const NODE_WAKELOCK_BLOCKER: &str = "wakelock_blocker";
pub const NODE_WAKELOCK_BLOCKER_DEFAULT: &str = "wakelock_blocker_default";
pub const NODE_DEBUG: &str = "debug";
pub const NODE_VERSION: &str = "version";
pub const WAKEUP_SOURCES: &str = "/sys/kernel/debug/wakeup_sources";

// Daemon files
pub const CONFIG_FILE: &str = "/data/adb/wl_blocker/config.toml";
pub const LOG_LEVEL_PATH: &str = "/data/adb/wl_blocker/log/log_level";
