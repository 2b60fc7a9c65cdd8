//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::{parse_duration, ConfigOverrides};
use crate::probe::Protocol;
use crate::reporter::ReportFormat;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Host Vitals - 有界并发的主机可达性检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "host-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "配置文件路径",
        env = "HOST_VITALS_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "HOST_VITALS_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 是否以JSON格式输出日志
    #[arg(long, global = true, help = "以JSON格式输出日志")]
    pub log_json: bool,

    /// 日志文件路径
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "将日志写入文件而不是标准错误",
        env = "HOST_VITALS_LOG_FILE"
    )]
    pub log_file: Option<PathBuf>,

    /// 是否启用详细输出
    #[arg(short, long, global = true, help = "启用详细输出")]
    pub verbose: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 执行可达性检测（单轮或周期）
    Check(CheckArgs),

    /// 验证配置并打印最终运行配置
    Validate(CheckArgs),

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "host-vitals.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 检测参数
#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct CheckArgs {
    /// 要检测的主机（TCP 模式为 host:port）
    #[arg(value_name = "HOST", help = "要检测的主机，TCP 模式需包含端口")]
    pub hosts: Vec<String>,

    /// 主机列表文件
    #[arg(short = 'f', long = "file", value_name = "FILE", help = "主机列表文件，每行一个")]
    pub hosts_file: Option<PathBuf>,

    /// 并发探测数
    #[arg(
        short = 'c',
        long,
        value_name = "COUNT",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "并发探测数（默认10）",
        env = "HOST_VITALS_CONCURRENCY"
    )]
    pub concurrency: Option<u64>,

    /// 单次探测超时时间
    #[arg(
        short = 't',
        long,
        value_name = "DURATION",
        value_parser = parse_duration_arg,
        help = "单次探测超时时间，如 2s、500ms（默认2s）"
    )]
    pub timeout: Option<Duration>,

    /// 检测间隔
    #[arg(
        short = 'i',
        long,
        value_name = "DURATION",
        value_parser = parse_duration_arg,
        help = "周期检测间隔，0 表示只检测一轮"
    )]
    pub interval: Option<Duration>,

    /// 检测轮数
    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        help = "检测轮数，0 表示不限（仅周期模式）"
    )]
    pub count: Option<u64>,

    /// 探测协议
    #[arg(short = 'm', long, value_enum, help = "探测协议", conflicts_with = "icmp")]
    pub mode: Option<ProbeMode>,

    /// 使用ICMP代替TCP
    #[arg(long, help = "使用ICMP（ping）代替TCP")]
    pub icmp: bool,

    /// 输出格式
    #[arg(long, value_enum, help = "输出格式", conflicts_with = "json")]
    pub format: Option<OutputFormat>,

    /// 以JSON格式输出结果
    #[arg(short = 'j', long, help = "以JSON格式输出结果")]
    pub json: bool,
}

impl CheckArgs {
    /// 转换为配置覆盖项
    pub fn to_overrides(&self) -> ConfigOverrides {
        let protocol = if self.icmp {
            Some(Protocol::Icmp)
        } else {
            self.mode.map(Protocol::from)
        };

        let format = if self.json {
            Some(ReportFormat::Json)
        } else {
            self.format.map(ReportFormat::from)
        };

        ConfigOverrides {
            hosts: self.hosts.clone(),
            hosts_file: self.hosts_file.clone(),
            concurrency: self.concurrency.map(|c| c as usize),
            timeout: self.timeout,
            interval: self.interval,
            count: self.count,
            protocol,
            format,
        }
    }
}

/// clap 使用的时间间隔解析器
fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

/// 探测协议
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ProbeMode {
    /// TCP 连接
    Tcp,
    /// ICMP 回显
    Icmp,
}

impl From<ProbeMode> for Protocol {
    fn from(mode: ProbeMode) -> Self {
        match mode {
            ProbeMode::Tcp => Protocol::Tcp,
            ProbeMode::Icmp => Protocol::Icmp,
        }
    }
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

impl Args {
    /// 是否启用详细输出
    pub fn is_verbose(&self) -> bool {
        self.verbose || matches!(self.log_level, LogLevel::Debug)
    }

    /// 实际生效的日志级别，详细模式至少为debug
    pub fn effective_log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            self.log_level.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_check_defaults() {
        let args = parse(&["host-vitals", "check", "example.com:443"]);
        let Commands::Check(check) = &args.command else {
            panic!("expected check command");
        };

        assert_eq!(check.hosts, vec!["example.com:443"]);
        let overrides = check.to_overrides();
        assert_eq!(overrides.concurrency, None);
        assert_eq!(overrides.protocol, None);
        assert_eq!(overrides.format, None);
    }

    #[test]
    fn test_check_all_flags() {
        let args = parse(&[
            "host-vitals",
            "check",
            "-f",
            "hosts.txt",
            "-c",
            "4",
            "-t",
            "500ms",
            "-i",
            "10s",
            "-n",
            "3",
            "--icmp",
            "-j",
            "10.0.0.1",
            "10.0.0.2",
        ]);
        let Commands::Check(check) = &args.command else {
            panic!("expected check command");
        };

        assert_eq!(
            check.to_overrides(),
            ConfigOverrides {
                hosts: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
                hosts_file: Some(PathBuf::from("hosts.txt")),
                concurrency: Some(4),
                timeout: Some(Duration::from_millis(500)),
                interval: Some(Duration::from_secs(10)),
                count: Some(3),
                protocol: Some(Protocol::Icmp),
                format: Some(ReportFormat::Json),
            }
        );
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Args::try_parse_from(["host-vitals", "check", "-c", "0", "a:1"]).is_err());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        assert!(Args::try_parse_from(["host-vitals", "check", "-t", "soon", "a:1"]).is_err());
    }

    #[test]
    fn test_mode_conflicts_with_icmp() {
        assert!(
            Args::try_parse_from(["host-vitals", "check", "--mode", "tcp", "--icmp", "a:1"])
                .is_err()
        );
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let args = parse(&["host-vitals", "-v", "check", "a:1"]);
        assert!(args.is_verbose());
        assert_eq!(args.effective_log_level(), log::LevelFilter::Debug);

        let args = parse(&["host-vitals", "check", "a:1", "--log-level", "warn"]);
        assert_eq!(args.effective_log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_log_file_flag() {
        let args = parse(&["host-vitals", "check", "a:1", "--log-file", "/tmp/hv.log"]);
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/hv.log")));

        let args = parse(&["host-vitals", "check", "a:1"]);
        assert_eq!(args.log_file, None);
    }

    #[test]
    fn test_init_default_path() {
        let args = parse(&["host-vitals", "init"]);
        match args.command {
            Commands::Init { config_path, force } => {
                assert_eq!(config_path, PathBuf::from("host-vitals.toml"));
                assert!(!force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
