//! 配置数据结构定义
//!
//! 定义运行配置、配置文件结构、命令行覆盖项和验证逻辑

use crate::error::ConfigError;
use crate::probe::Protocol;
use crate::reporter::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 默认并发探测数
pub const DEFAULT_CONCURRENCY: usize = 10;

/// 默认探测超时时间
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// 运行配置
///
/// 构造后只读，每轮检测共享同一份配置。
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// 主机列表（按顺序，允许重复）
    pub hosts: Vec<String>,
    /// 同时进行的探测数量上限
    pub concurrency_limit: usize,
    /// 单次探测超时时间
    pub probe_timeout: Duration,
    /// 探测协议
    pub protocol: Protocol,
    /// 检测间隔，为0时只执行一轮
    pub interval: Duration,
    /// 检测轮数上限，为0时不限
    pub repeat_count: u64,
    /// 输出格式
    pub format: ReportFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            concurrency_limit: DEFAULT_CONCURRENCY,
            probe_timeout: DEFAULT_TIMEOUT,
            protocol: Protocol::Tcp,
            interval: Duration::ZERO,
            repeat_count: 0,
            format: ReportFormat::Text,
        }
    }
}

impl RunConfig {
    /// 验证运行配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_run_config(self).map_err(ConfigError::ValidationError)
    }

    /// 是否为周期检测模式
    pub fn is_repeating(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// 配置文件结构（TOML）
///
/// 所有字段可选，未设置的字段使用默认值或命令行参数。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// 主机列表
    #[serde(default)]
    pub hosts: Vec<String>,
    /// 主机列表文件
    pub hosts_file: Option<PathBuf>,
    /// 并发探测数
    pub concurrency: Option<usize>,
    /// 探测超时时间
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// 检测间隔
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    /// 检测轮数
    pub count: Option<u64>,
    /// 探测协议
    pub protocol: Option<Protocol>,
    /// 输出格式
    pub format: Option<ReportFormat>,
}

/// 命令行覆盖项
///
/// 命令行中显式给出的值优先于配置文件。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// 命令行给出的主机
    pub hosts: Vec<String>,
    /// 命令行给出的主机列表文件
    pub hosts_file: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
    pub count: Option<u64>,
    pub protocol: Option<Protocol>,
    pub format: Option<ReportFormat>,
}

impl ConfigOverrides {
    /// 命令行是否指定了主机来源
    pub fn has_hosts(&self) -> bool {
        !self.hosts.is_empty() || self.hosts_file.is_some()
    }
}

/// 解析时间间隔，支持 `500ms`、`2s`、`1m` 等格式，`0` 表示零
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }

    humantime::parse_duration(trimmed).map_err(|e| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// 运行配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_run_config(config: &RunConfig) -> Result<(), String> {
    if config.hosts.is_empty() {
        return Err("未指定任何主机，请通过参数或 -f 选项提供主机".to_string());
    }

    if config.concurrency_limit == 0 {
        return Err("并发探测数不能为0".to_string());
    }

    if config.probe_timeout.is_zero() {
        return Err("探测超时时间不能为0".to_string());
    }

    if let Some(host) = config.hosts.iter().find(|host| host.trim().is_empty()) {
        return Err(format!("主机列表包含空条目: {host:?}"));
    }

    Ok(())
}
