/// Wakelock blocker 常量定义
/// 与内核中的 boeffla_wl_blocker 保持一致
pub const NOTES: &str = "Boeffla Wakelock Blocker Daemon";
pub const AUTHOR: &str = "Author: andip71, Seyud @GitHub";
pub const VERSION: &str = "Version: v1.1.0";

/// 内核侧 blocker 的版本号
pub const BOEFFLA_WL_BLOCKER_VERSION: &str = "1.1.0";

/// 默认屏蔽的唤醒锁列表（分号分隔）
pub const LIST_WL_DEFAULT: &str = "wlan_wake;wlan_rx_wake;wlan_ctrl_wake;wlan_txfl_wake;bluetooth_timer;BT_bt_wake;BT_host_wake;bbd_wake_lock;ssp_sensorhub_wake_lock;14860000.decon_f;ssp_wake_lock;ssp_comm_wake_lock;abox;umts_ipc0;umts_ipc1;mmc0_detect;grip_wake_lock;wlan_scan_wake;wlan_pm_wake;nfc_wake_lock";

/// 用户列表缓冲区大小
pub const LENGTH_LIST_WL: usize = 255;
/// 默认列表缓冲区大小，包含结尾的 NUL
pub const LENGTH_LIST_WL_DEFAULT: usize = LIST_WL_DEFAULT.len() + 1;
/// 搜索串缓冲区大小: ";user;default;" 加结尾 NUL
pub const LENGTH_LIST_WL_SEARCH: usize = LENGTH_LIST_WL + LENGTH_LIST_WL_DEFAULT + 5;

pub const LIST_DELIMITER: char = ';';

/// 唤醒锁名称长度上限，超出的名称不会被屏蔽
pub const MAX_WAKELOCK_NAME_LEN: usize = 50;

const _: () = assert!(LIST_WL_DEFAULT.len() < LENGTH_LIST_WL_DEFAULT);

pub mod monitor {
    pub const CONFIG_RELOAD_DELAY_MS: u64 = 200;
    pub const INOTIFY_RETRY_SECS: u64 = 1;
}
