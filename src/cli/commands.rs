//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, CheckArgs, Commands, OutputFormat};
use crate::config::{load_file_config, resolve_run_config, RunConfig};
use crate::error::Result;
use crate::probe::{prober_for, Scheduler, StopReason};
use crate::reporter::Reporter;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 根据参数加载配置文件并合并命令行覆盖项
async fn load_run_config(args: &Args, check: &CheckArgs) -> Result<RunConfig> {
    let file_config = load_file_config(args.config.as_deref()).await?;
    let overrides = check.to_overrides();
    resolve_run_config(file_config, overrides).await
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 配置文件模板
    pub const TEMPLATE: &'static str = include_str!("../../demos/host-vitals.toml");

    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(config_path, Self::TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件以添加要检测的主机");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate(check) = &args.command {
            let config = load_run_config(args, check).await?;
            self.print_config(&config, args.is_verbose());
        }
        Ok(())
    }
}

impl ValidateCommand {
    /// 打印最终运行配置
    fn print_config(&self, config: &RunConfig, verbose: bool) {
        println!("✓ 配置验证通过");
        println!("✓ 共 {} 个主机", config.hosts.len());
        println!("  探测协议: {}", config.protocol);
        println!("  并发探测数: {}", config.concurrency_limit);
        println!(
            "  探测超时: {}",
            humantime::format_duration(config.probe_timeout)
        );

        if config.is_repeating() {
            println!("  检测间隔: {}", humantime::format_duration(config.interval));
            if config.repeat_count == 0 {
                println!("  检测轮数: 不限");
            } else {
                println!("  检测轮数: {}", config.repeat_count);
            }
        } else {
            println!("  检测模式: 单轮");
        }
        println!("  输出格式: {}", config.format);

        if verbose {
            println!("主机列表:");
            for (i, host) in config.hosts.iter().enumerate() {
                println!("  {}. {}", i + 1, host);
            }
        }
    }
}

/// 检测命令
pub struct CheckCommand {
    /// 进程级取消信号
    cancel: CancellationToken,
}

impl CheckCommand {
    /// 创建检测命令
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check(check) = &args.command {
            let config = load_run_config(args, check).await?;
            self.run_checks(&config).await;
        }
        Ok(())
    }
}

impl CheckCommand {
    /// 执行检测，每轮结束后输出结果到标准输出
    async fn run_checks(&self, config: &RunConfig) {
        info!(
            "开始检测 {} 个主机（协议: {}，并发: {}，超时: {}）",
            config.hosts.len(),
            config.protocol,
            config.concurrency_limit,
            humantime::format_duration(config.probe_timeout)
        );

        let prober = prober_for(config.protocol);
        let mut scheduler = Scheduler::new(config, prober, self.cancel.clone());
        let mut reporter = Reporter::new(config.format, std::io::stdout());

        let summary = scheduler.run(|report| reporter.report(report)).await;

        if summary.stop_reason == StopReason::Cancelled {
            info!("检测已被中断，共完成 {} 轮", summary.cycles_completed);
        }
    }
}
