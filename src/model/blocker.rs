use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use log::{debug, info};

use crate::{
    model::wl_list::{WakelockList, is_valid_name},
    utils::constants::{
        BOEFFLA_WL_BLOCKER_VERSION, LENGTH_LIST_WL, LENGTH_LIST_WL_DEFAULT,
        LENGTH_LIST_WL_SEARCH, LIST_DELIMITER, LIST_WL_DEFAULT,
    },
};

pub type SharedBlocker = Arc<Mutex<WakelockBlocker>>;

/// 唤醒锁匹配器，与内核 blocker 的状态一一对应
#[derive(Debug, Clone)]
pub struct WakelockBlocker {
    list_wl: String,
    list_wl_default: String,
    list_wl_search: String,
    active: bool,
    debug: bool,
}

impl WakelockBlocker {
    pub fn new() -> Self {
        let mut blocker = Self {
            list_wl: String::new(),
            list_wl_default: LIST_WL_DEFAULT.to_string(),
            list_wl_search: String::new(),
            active: false,
            debug: false,
        };
        blocker.build_search_string();
        blocker
    }

    pub fn shared(self) -> SharedBlocker {
        Arc::new(Mutex::new(self))
    }

    // ";user;default;"
    fn build_search_string(&mut self) {
        self.list_wl_search = format!(
            "{d}{}{d}{}{d}",
            self.list_wl,
            self.list_wl_default,
            d = LIST_DELIMITER
        );
        self.active = self
            .list_wl_search
            .split(LIST_DELIMITER)
            .any(|t| !t.is_empty());

        debug_assert!(self.list_wl_search.len() < LENGTH_LIST_WL_SEARCH);
    }

    /// 写入用户列表，只保留第一个空白之前的内容
    pub fn store_user_list(&mut self, input: &str) -> Result<()> {
        self.list_wl = Self::bounded_store(input, LENGTH_LIST_WL)?;
        self.build_search_string();
        debug!("User wakelock list set to: {}", self.list_wl);
        Ok(())
    }

    pub fn store_default_list(&mut self, input: &str) -> Result<()> {
        self.list_wl_default = Self::bounded_store(input, LENGTH_LIST_WL_DEFAULT)?;
        self.build_search_string();
        debug!("Default wakelock list set to: {}", self.list_wl_default);
        Ok(())
    }

    fn bounded_store(input: &str, capacity: usize) -> Result<String> {
        if input.len() > capacity {
            bail!(
                "Input of {} bytes exceeds list capacity of {} bytes",
                input.len(),
                capacity
            );
        }

        let value = input.split_whitespace().next().unwrap_or("");
        if value.len() + 1 > capacity {
            bail!(
                "List of {} bytes does not fit a {} byte buffer",
                value.len(),
                capacity
            );
        }

        Ok(value.to_string())
    }

    pub fn store_debug(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "0" => self.debug = false,
            "1" => self.debug = true,
            other => bail!("Invalid debug value '{}': expected 0 or 1", other),
        }
        info!("Wakelock blocker debug: {}", self.debug);
        Ok(())
    }

    pub fn set_user_list(&mut self, list: &WakelockList) -> Result<()> {
        self.store_user_list(&list.encode())
    }

    pub fn set_default_list(&mut self, list: &WakelockList) -> Result<()> {
        self.store_default_list(&list.encode())
    }

    pub fn show_user_list(&self) -> String {
        format!("{}\n", self.list_wl)
    }

    pub fn show_default_list(&self) -> String {
        format!("{}\n", self.list_wl_default)
    }

    pub fn show_debug(&self) -> String {
        format!("Debug status: {}\n", u8::from(self.debug))
    }

    pub fn show_version(&self) -> String {
        format!("{BOEFFLA_WL_BLOCKER_VERSION}\n")
    }

    pub fn default_list(&self) -> WakelockList {
        WakelockList::parse(&self.list_wl_default)
    }

    pub fn search_string(&self) -> &str {
        &self.list_wl_search
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// 名称是否作为完整的一项出现在用户列表或默认列表中
    pub fn check_for_block(&self, name: &str) -> bool {
        if !self.active {
            return false;
        }

        // 含分号或空白的名称会跨项匹配
        if !is_valid_name(name) {
            return false;
        }

        let needle = format!("{d}{name}{d}", d = LIST_DELIMITER);
        if !self.list_wl_search.contains(&needle) {
            return false;
        }

        if self.debug {
            debug!("Wakelock blocked: {name}");
        }
        true
    }
}

impl Default for WakelockBlocker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::MAX_WAKELOCK_NAME_LEN;

    #[test]
    fn test_default_blocks_default_names() {
        let blocker = WakelockBlocker::new();
        assert!(blocker.is_active());
        assert!(blocker.check_for_block("wlan_wake"));
        assert!(blocker.check_for_block("nfc_wake_lock"));
        assert!(blocker.check_for_block("14860000.decon_f"));
        assert!(!blocker.check_for_block("PowerManagerService.Display"));
    }

    #[test]
    fn test_match_is_whole_token() {
        let blocker = WakelockBlocker::new();
        assert!(!blocker.check_for_block("wlan"));
        assert!(!blocker.check_for_block("wake"));
        assert!(!blocker.check_for_block("wlan_wake;wlan_rx_wake"));
        assert!(!blocker.check_for_block(";wlan_wake"));
        assert!(!blocker.check_for_block("wlan_wake;"));
    }

    #[test]
    fn test_delimiter_or_whitespace_never_blocked() {
        let mut blocker = WakelockBlocker::new();
        blocker.store_user_list("a;b").unwrap();
        assert!(blocker.check_for_block("a"));
        assert!(blocker.check_for_block("b"));

        for name in ["a;b", ";a", "a;", " a", "a ", "a\tb", ";"] {
            assert!(!blocker.check_for_block(name), "{name:?} must not match");
        }
    }

    #[test]
    fn test_user_list_is_searched() {
        let mut blocker = WakelockBlocker::new();
        blocker.store_user_list("NETLINK;qcom_rx_wakelock\n").unwrap();
        assert_eq!(blocker.show_user_list(), "NETLINK;qcom_rx_wakelock\n");
        assert!(blocker.check_for_block("NETLINK"));
        assert!(blocker.check_for_block("qcom_rx_wakelock"));
        assert!(blocker.check_for_block("abox"));
    }

    #[test]
    fn test_store_stops_at_whitespace() {
        let mut blocker = WakelockBlocker::new();
        blocker.store_user_list("a;b c;d").unwrap();
        assert_eq!(blocker.show_user_list(), "a;b\n");
        assert!(!blocker.check_for_block("d"));
    }

    #[test]
    fn test_store_rejects_oversized_input() {
        let mut blocker = WakelockBlocker::new();
        blocker.store_user_list("keep").unwrap();

        let too_long = "a".repeat(LENGTH_LIST_WL + 1);
        assert!(blocker.store_user_list(&too_long).is_err());
        let no_room_for_nul = "a".repeat(LENGTH_LIST_WL);
        assert!(blocker.store_user_list(&no_room_for_nul).is_err());
        assert_eq!(blocker.show_user_list(), "keep\n");

        let fits = "a".repeat(LENGTH_LIST_WL - 1);
        assert!(blocker.store_user_list(&fits).is_ok());
    }

    #[test]
    fn test_empty_lists_deactivate() {
        let mut blocker = WakelockBlocker::new();
        blocker.store_default_list("").unwrap();
        blocker.store_user_list("").unwrap();
        assert!(!blocker.is_active());
        assert_eq!(blocker.search_string(), ";;;");
        assert!(!blocker.check_for_block("wlan_wake"));

        blocker.store_user_list("x").unwrap();
        assert!(blocker.is_active());
        assert!(blocker.check_for_block("x"));
    }

    #[test]
    fn test_name_length_limits() {
        let mut blocker = WakelockBlocker::new();
        let long = "w".repeat(MAX_WAKELOCK_NAME_LEN + 1);
        blocker.store_user_list(&long).unwrap();
        assert!(!blocker.check_for_block(&long));
        assert!(!blocker.check_for_block(""));
    }

    #[test]
    fn test_search_string_within_bound() {
        let mut blocker = WakelockBlocker::new();
        blocker
            .store_user_list(&"u".repeat(LENGTH_LIST_WL - 1))
            .unwrap();
        blocker
            .store_default_list(&"d".repeat(LENGTH_LIST_WL_DEFAULT - 1))
            .unwrap();
        assert!(blocker.search_string().len() + 1 <= LENGTH_LIST_WL_SEARCH);
    }

    #[test]
    fn test_debug_flag() {
        let mut blocker = WakelockBlocker::new();
        assert_eq!(blocker.show_debug(), "Debug status: 0\n");
        blocker.store_debug("1\n").unwrap();
        assert!(blocker.is_debug());
        assert_eq!(blocker.show_debug(), "Debug status: 1\n");
        assert!(blocker.store_debug("2").is_err());
        assert!(blocker.store_debug("yes").is_err());
        assert!(blocker.is_debug());
    }

    #[test]
    fn test_version() {
        assert_eq!(WakelockBlocker::new().show_version(), "1.1.0\n");
    }
}
