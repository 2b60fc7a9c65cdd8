//! ICMP 回显请求
//!
//! 通过系统 `ping` 工具完成单次回显，可替换为原生 ICMP 实现或测试替身

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// 回显请求trait
#[async_trait]
pub trait EchoRequester: Send + Sync {
    /// 向主机发送一次回显请求
    ///
    /// # 参数
    /// * `host` - 目标主机
    /// * `timeout` - 本次调用的超时时间
    ///
    /// # 返回
    /// * `Result<(), String>` - 成功或可读的失败原因
    async fn echo(&self, host: &str, timeout: Duration) -> Result<(), String>;
}

/// 调用系统 ping 命令的回显实现
#[derive(Debug, Clone)]
pub struct SystemPing {
    /// ping 程序路径
    program: String,
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new("ping")
    }
}

impl SystemPing {
    /// 使用指定的 ping 程序创建
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 构建单次回显的命令行参数
    pub fn build_args(host: &str, timeout: Duration) -> Vec<String> {
        // ping 的超时参数按整秒计，至少1秒
        let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;

        if cfg!(target_os = "windows") {
            let millis = timeout.as_millis().max(1);
            vec![
                "-n".to_string(),
                "1".to_string(),
                "-w".to_string(),
                millis.to_string(),
                host.to_string(),
            ]
        } else if cfg!(target_os = "macos") {
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-t".to_string(),
                secs.to_string(),
                host.to_string(),
            ]
        } else {
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                secs.to_string(),
                host.to_string(),
            ]
        }
    }
}

#[async_trait]
impl EchoRequester for SystemPing {
    async fn echo(&self, host: &str, timeout_duration: Duration) -> Result<(), String> {
        let mut command = Command::new(&self.program);
        command
            .args(Self::build_args(host, timeout_duration))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match timeout(timeout_duration, command.output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                match stderr.lines().map(str::trim).find(|line| !line.is_empty()) {
                    Some(line) => Err(format!("{} ({line})", output.status)),
                    None => Err(output.status.to_string()),
                }
            }
            Ok(Err(e)) => Err(format!("failed to execute {}: {e}", self.program)),
            Err(_) => Err(format!(
                "no reply within {}",
                humantime::format_duration(timeout_duration)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_single_round_trip() {
        let args = SystemPing::build_args("10.0.0.1", Duration::from_millis(1500));
        assert_eq!(args.last().map(String::as_str), Some("10.0.0.1"));
        assert!(args.iter().any(|arg| arg == "1"));

        #[cfg(target_os = "linux")]
        assert_eq!(args, vec!["-c", "1", "-W", "2", "10.0.0.1"]);
    }

    #[test]
    fn test_build_args_minimum_one_second() {
        let args = SystemPing::build_args("host", Duration::from_millis(100));
        #[cfg(target_os = "linux")]
        assert_eq!(args[3], "1");
        assert_eq!(args.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_program_reports_exec_failure() {
        let ping = SystemPing::new("/nonexistent/ping-binary");
        let err = ping
            .echo("127.0.0.1", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.contains("failed to execute"));
    }
}
