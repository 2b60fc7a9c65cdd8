//! 配置解析集成测试
//!
//! 测试配置文件、主机列表文件与命令行参数的合并

use clap::Parser;
use host_vitals::cli::{Args, Commands};
use host_vitals::config::{load_file_config, resolve_run_config};
use host_vitals::error::{ConfigError, HostVitalsError};
use host_vitals::probe::Protocol;
use host_vitals::reporter::ReportFormat;
use std::time::Duration;
use tempfile::TempDir;

async fn resolve(argv: &[&str]) -> host_vitals::error::Result<host_vitals::RunConfig> {
    let args = Args::try_parse_from(argv).unwrap();
    let Commands::Check(check) = &args.command else {
        panic!("expected check command");
    };
    let file = load_file_config(args.config.as_deref()).await?;
    resolve_run_config(file, check.to_overrides()).await
}

#[tokio::test]
async fn test_cli_values_override_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("host-vitals.toml");
    std::fs::write(
        &config_path,
        r#"
hosts = ["file-a:80"]
concurrency = 4
timeout = "5s"
format = "json"
"#,
    )
    .unwrap();
    let config_arg = config_path.to_str().unwrap();

    let config = resolve(&["host-vitals", "--config", config_arg, "check"])
        .await
        .unwrap();
    assert_eq!(config.hosts, vec!["file-a:80"]);
    assert_eq!(config.concurrency_limit, 4);
    assert_eq!(config.probe_timeout, Duration::from_secs(5));
    assert_eq!(config.format, ReportFormat::Json);

    let config = resolve(&[
        "host-vitals",
        "--config",
        config_arg,
        "check",
        "-c",
        "2",
        "-t",
        "300ms",
        "--format",
        "text",
        "cli-b:22",
    ])
    .await
    .unwrap();
    assert_eq!(config.hosts, vec!["cli-b:22"]);
    assert_eq!(config.concurrency_limit, 2);
    assert_eq!(config.probe_timeout, Duration::from_millis(300));
    assert_eq!(config.format, ReportFormat::Text);
}

#[tokio::test]
async fn test_hosts_file_skips_blank_and_comment_lines() {
    let temp_dir = TempDir::new().unwrap();
    let hosts_path = temp_dir.path().join("hosts.txt");
    std::fs::write(
        &hosts_path,
        "# 核心节点\n10.0.0.1\n\n   \n  10.0.0.2  \n#10.0.0.3\n",
    )
    .unwrap();

    let config = resolve(&[
        "host-vitals",
        "check",
        "--icmp",
        "10.0.0.9",
        "-f",
        hosts_path.to_str().unwrap(),
    ])
    .await
    .unwrap();

    assert_eq!(config.hosts, vec!["10.0.0.9", "10.0.0.1", "10.0.0.2"]);
    assert_eq!(config.protocol, Protocol::Icmp);
}

#[tokio::test]
async fn test_missing_hosts_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.txt");

    let err = resolve(&["host-vitals", "check", "-f", missing.to_str().unwrap()])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HostVitalsError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn test_explicit_missing_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let err = resolve(&[
        "host-vitals",
        "--config",
        missing.to_str().unwrap(),
        "check",
        "a:1",
    ])
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        HostVitalsError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn test_interval_and_count_flags() {
    let config = resolve(&["host-vitals", "check", "-i", "1m", "-n", "3", "a:1"])
        .await
        .unwrap();

    assert!(config.is_repeating());
    assert_eq!(config.interval, Duration::from_secs(60));
    assert_eq!(config.repeat_count, 3);
}
