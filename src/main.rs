//! Host Vitals 主程序入口
//!
//! 有界并发的主机可达性检测工具

use anyhow::{Context, Result};
use clap::Parser;
use host_vitals::cli::args::{Args, Commands};
use host_vitals::cli::commands::{
    CheckCommand, Command, InitCommand, ValidateCommand, VersionCommand,
};
use host_vitals::logging::{LogConfig, LoggingSystem};
use host_vitals::shutdown::install_signal_handlers;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统，未指定日志文件时写入标准错误
    let log_config = LogConfig {
        level: args.effective_log_level(),
        file_path: args.log_file.clone(),
        json_format: args.log_json,
    };

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    debug!("Host Vitals v{} 启动", host_vitals::VERSION);

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Check(_) => {
            let cancel = CancellationToken::new();
            install_signal_handlers(cancel.clone()).context("安装信号处理器失败")?;

            let command = CheckCommand::new(cancel);
            command.execute(args).await.map_err(anyhow::Error::from)
        }
        Commands::Validate(_) => {
            let command = ValidateCommand;
            command.execute(args).await.map_err(anyhow::Error::from)
        }
        Commands::Init { .. } => {
            let command = InitCommand;
            command.execute(args).await.map_err(anyhow::Error::from)
        }
        Commands::Version { .. } => {
            let command = VersionCommand;
            command.execute(args).await.map_err(anyhow::Error::from)
        }
    }
}
