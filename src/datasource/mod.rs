pub mod config_parser;
pub mod file_path;
pub mod node_monitor;
pub mod wakeup_sources;
