use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    model::{blocker::WakelockBlocker, wl_list::WakelockList},
    utils::constants::{LENGTH_LIST_WL, LENGTH_LIST_WL_DEFAULT},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerSection {
    pub debug: bool,
    pub use_default_list: bool,
    pub wakelocks: Vec<String>,
    /// 覆盖内置默认列表
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_wakelocks: Option<Vec<String>>,
}

impl Default for BlockerSection {
    fn default() -> Self {
        Self {
            debug: false,
            use_default_list: true,
            wakelocks: Vec::new(),
            default_wakelocks: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub blocker: BlockerSection,
}

impl Config {
    pub fn user_list(&self) -> WakelockList {
        self.blocker.wakelocks.iter().collect()
    }

    /// 实际生效的默认列表
    pub fn default_list(&self) -> WakelockList {
        if !self.blocker.use_default_list {
            return WakelockList::new();
        }
        match &self.blocker.default_wakelocks {
            Some(names) => names.iter().collect(),
            None => WakelockList::default_list(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.user_list()
            .validate(LENGTH_LIST_WL)
            .context("Invalid [blocker].wakelocks")?;
        self.default_list()
            .validate(LENGTH_LIST_WL_DEFAULT)
            .context("Invalid [blocker].default_wakelocks")?;
        Ok(())
    }

    pub fn apply_to(&self, blocker: &mut WakelockBlocker) -> Result<()> {
        blocker.set_user_list(&self.user_list())?;
        blocker.set_default_list(&self.default_list())?;
        blocker.store_debug(if self.blocker.debug { "1" } else { "0" })?;
        Ok(())
    }
}

pub fn config_parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
    config.validate()?;
    Ok(config)
}

pub fn config_read<P: AsRef<Path>>(config_file: P) -> Result<Config> {
    let path = config_file.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = config_parse(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    info!(
        "Loaded config: {} user wakelocks, {} default wakelocks, debug={}",
        config.user_list().len(),
        config.default_list().len(),
        config.blocker.debug
    );
    for name in config.user_list().iter() {
        debug!("User wakelock: {name}");
    }

    Ok(config)
}

/// 生成默认配置文件
pub fn gen_default_config<P: AsRef<Path>>(config_file: P) -> Result<Config> {
    let path = config_file.as_ref();
    warn!("Config file not found, generating default: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
    }

    let config = Config::default();
    let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(config)
}

pub fn config_load_or_init<P: AsRef<Path>>(config_file: P) -> Result<Config> {
    let path = config_file.as_ref();
    if path.exists() {
        config_read(path)
    } else {
        gen_default_config(path)
    }
}
