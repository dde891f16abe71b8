mod datasource;
mod model;
mod utils;

use std::{env, path::Path, thread};

use anyhow::{Result, anyhow};
use log::{error, info, warn};

use crate::{
    datasource::{
        config_parser::{config_load_or_init, config_read},
        file_path::*,
        node_monitor::monitor_config,
        wakeup_sources::{blocked_report, read_wakeup_sources},
    },
    model::{blocker::WakelockBlocker, kernel_node::KernelNodes},
    utils::{
        constants::{AUTHOR, NOTES, VERSION},
        log_monitor::monitor_log_level,
        logger::init_logger,
    },
};

fn print_banner() {
    println!("{}", NOTES);
    println!("{}", AUTHOR);
}

fn print_help() {
    print_banner();
    println!("Usage:");
    println!("\t-c <name> check whether a wakelock would be blocked");
    println!("\t-s show wakeup sources and their block status");
    println!("\t-v show version");
    println!("\t-h show help");
}

/// 从配置文件构建匹配器，配置不存在时使用默认列表
fn load_blocker() -> Result<WakelockBlocker> {
    let mut blocker = WakelockBlocker::new();
    if Path::new(CONFIG_FILE).exists() {
        config_read(CONFIG_FILE)?.apply_to(&mut blocker)?;
    }
    Ok(blocker)
}

fn check_name(name: &str) -> Result<()> {
    let blocker = load_blocker()?;
    if blocker.check_for_block(name) {
        println!("{name}: blocked");
    } else {
        println!("{name}: allowed");
    }
    Ok(())
}

fn show_sources() -> Result<()> {
    let blocker = load_blocker()?;
    let sources = read_wakeup_sources(WAKEUP_SOURCES)?;

    println!(
        "{:<50} {:>8} {:>12} {:>12}  status",
        "name", "active", "total(ms)", "prevent(ms)"
    );
    for (source, blocked) in blocked_report(&sources, &blocker) {
        println!(
            "{:<50} {:>8} {:>12} {:>12}  {}",
            source.name,
            source.active_count,
            source.total_time_ms,
            source.prevent_suspend_time_ms,
            if blocked { "blocked" } else { "-" }
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "-h" => {
                print_help();
                return Ok(());
            }
            "-v" => {
                print_banner();
                println!("{}", VERSION);
                print!("Blocker version: {}", WakelockBlocker::new().show_version());
                return Ok(());
            }
            "-c" => {
                let name = args
                    .get(2)
                    .ok_or_else(|| anyhow!("Missing wakelock name for -c"))?;
                return check_name(name);
            }
            "-s" => return show_sources(),
            other => {
                println!("Unknown argument: {}", other);
                println!("Use -h for help");
                return Ok(());
            }
        }
    }

    init_logger()?;

    info!("{}", NOTES);
    info!("{}", AUTHOR);
    info!("{}", VERSION);

    let nodes = KernelNodes::probe(BLOCKER_NODE_ROOT);

    let config_file = Path::new(CONFIG_FILE);
    info!("Reading config file: {}", config_file.display());
    let config = match config_load_or_init(config_file) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config file: {e:#}");
            return Err(e);
        }
    };

    let mut blocker = WakelockBlocker::new();
    config.apply_to(&mut blocker)?;
    nodes.push(&blocker)?;

    info!("Active: {}", if blocker.is_active() { "Yes" } else { "No" });
    info!("User list: {}", blocker.show_user_list().trim());
    let default_list = blocker.default_list();
    if default_list.is_empty() {
        info!("Default list: disabled");
    } else {
        info!("Default list: {} entries", default_list.len());
    }
    info!("{}", blocker.show_debug().trim());

    if let Some(version) = nodes.kernel_version() {
        info!("Kernel blocker version: {version}");
        match nodes.pull() {
            Ok(kernel) if kernel.search_string() == blocker.search_string() => {
                info!("Kernel state verified");
            }
            Ok(kernel) => warn!(
                "Kernel state differs after push: {}",
                kernel.search_string()
            ),
            Err(e) => warn!("Failed to read back kernel state: {e:#}"),
        }
    }

    thread::spawn(move || {
        if let Err(e) = monitor_log_level() {
            error!("Log level monitor error: {e:#}");
        }
    });

    info!("{} Start", MAIN_THREAD);

    // 主线程负责监控配置
    monitor_config(config_file, blocker.shared(), nodes)
}
