use std::fmt;

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::constants::{LIST_DELIMITER, LIST_WL_DEFAULT, MAX_WAKELOCK_NAME_LEN};

// 1..=50 字节，不含空白和分号
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[^\s;]{{1,{MAX_WAKELOCK_NAME_LEN}}}$"))
        .expect("wakelock name pattern is valid")
});

pub fn is_valid_name(name: &str) -> bool {
    name.len() <= MAX_WAKELOCK_NAME_LEN && NAME_RE.is_match(name)
}

/// 分号分隔的唤醒锁名称列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WakelockList {
    tokens: Vec<String>,
}

impl WakelockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析分号分隔的列表，忽略空项和重复项
    pub fn parse(raw: &str) -> Self {
        let mut list = Self::new();
        for token in raw.trim().split(LIST_DELIMITER) {
            list.push(token.trim());
        }
        list
    }

    pub fn default_list() -> Self {
        Self::parse(LIST_WL_DEFAULT)
    }

    /// 添加名称，空名称和已存在的名称直接忽略
    pub fn push(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.tokens.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.iter().any(|t| t == name)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn encode(&self) -> String {
        let separator = LIST_DELIMITER.to_string();
        self.tokens.join(separator.as_str())
    }

    pub fn encoded_len(&self) -> usize {
        let separators = self.tokens.len().saturating_sub(1);
        self.tokens.iter().map(String::len).sum::<usize>() + separators
    }

    /// 检查列表能否写入容量为 `capacity` 的节点（含结尾 NUL）
    pub fn validate(&self, capacity: usize) -> Result<()> {
        if let Some(bad) = self.iter().find(|t| !is_valid_name(t)) {
            bail!(
                "Invalid wakelock name '{}': expected 1-{} bytes without whitespace or ';'",
                bad,
                MAX_WAKELOCK_NAME_LEN
            );
        }

        let needed = self.encoded_len() + 1;
        if needed > capacity {
            bail!(
                "Wakelock list too long: {} bytes needed, capacity is {} bytes",
                needed,
                capacity
            );
        }

        Ok(())
    }
}

impl fmt::Display for WakelockList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<S: AsRef<str>> FromIterator<S> for WakelockList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.push(name.as_ref().trim());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{LENGTH_LIST_WL, LENGTH_LIST_WL_DEFAULT};

    #[test]
    fn test_parse_skips_empty_and_duplicates() {
        let list = WakelockList::parse(";a;;b;a;");
        assert_eq!(list.len(), 2);
        assert_eq!(list.encode(), "a;b");
    }

    #[test]
    fn test_default_list_fits_default_buffer() {
        let list = WakelockList::default_list();
        assert_eq!(list.len(), 20);
        assert_eq!(list.encode(), LIST_WL_DEFAULT);
        assert_eq!(list.encoded_len(), LIST_WL_DEFAULT.len());
        assert!(list.validate(LENGTH_LIST_WL_DEFAULT).is_ok());
        // 默认列表比用户缓冲区长
        assert!(list.validate(LENGTH_LIST_WL).is_err());
    }

    #[test]
    fn test_contains_is_exact() {
        let list = WakelockList::parse("wlan_wake;abox");
        assert!(list.contains("abox"));
        assert!(!list.contains("wlan"));
        assert!(!list.contains("ABOX"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let long = "x".repeat(MAX_WAKELOCK_NAME_LEN + 1);
        let list: WakelockList = ["ok", long.as_str()].into_iter().collect();
        assert!(list.validate(LENGTH_LIST_WL).is_err());

        let list: WakelockList = ["has space"].into_iter().collect();
        assert!(list.validate(LENGTH_LIST_WL).is_err());
    }

    #[test]
    fn test_validate_capacity_counts_terminator() {
        let list = WakelockList::parse("abcd");
        assert!(list.validate(5).is_ok());
        assert!(list.validate(4).is_err());
    }

    #[test]
    fn test_empty_list() {
        let list = WakelockList::parse("");
        assert!(list.is_empty());
        assert_eq!(list.encoded_len(), 0);
        assert_eq!(list.to_string(), "");
    }
}
