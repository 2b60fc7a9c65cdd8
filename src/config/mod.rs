//! 配置管理模块
//!
//! 提供配置文件解析、主机列表读取、命令行覆盖合并和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{
    get_default_config_path, load_file_config, load_hosts_file, parse_hosts, resolve_run_config,
    ConfigLoader, TomlConfigLoader,
};
pub use types::{
    parse_duration, validate_run_config, ConfigOverrides, FileConfig, RunConfig,
    DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT,
};
