//! 信号处理模块
//!
//! 将操作员中断（SIGINT/SIGTERM/Ctrl+C）转换为进程级取消信号。
//! 取消信号只触发一次且不会被重置。

use crate::error::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[cfg(unix)]
use signal_hook::consts::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook_tokio::Signals;

/// 安装信号处理器
///
/// 收到第一个中断信号时取消 `cancel`。必须在 tokio 运行时中调用。
pub fn install_signal_handlers(cancel: CancellationToken) -> Result<()> {
    #[cfg(unix)]
    {
        install_unix_signals(cancel)
    }
    #[cfg(not(unix))]
    {
        install_ctrl_c(cancel);
        Ok(())
    }
}

/// Unix/Linux系统信号处理
#[cfg(unix)]
fn install_unix_signals(cancel: CancellationToken) -> Result<()> {
    use futures::stream::StreamExt;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();

    tokio::spawn(async move {
        tokio::select! {
            signal = signals.next() => {
                match signal {
                    Some(SIGINT) => info!("接收到 SIGINT 信号，正在停止..."),
                    Some(SIGTERM) => info!("接收到 SIGTERM 信号，正在停止..."),
                    Some(other) => info!("接收到信号 {other}，正在停止..."),
                    None => return,
                }
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
        handle.close();
    });

    Ok(())
}

/// 非Unix系统只处理 Ctrl+C
#[cfg(not(unix))]
fn install_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("接收到 Ctrl+C，正在停止..."),
                    Err(e) => tracing::error!("监听中断信号失败: {e}"),
                }
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_signal_handlers() {
        let cancel = CancellationToken::new();
        assert!(install_signal_handlers(cancel.clone()).is_ok());
        assert!(!cancel.is_cancelled());

        // 监听任务在取消后自行退出
        cancel.cancel();
        tokio::task::yield_now().await;
        assert!(cancel.is_cancelled());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_cancels_token() {
        let cancel = CancellationToken::new();
        install_signal_handlers(cancel.clone()).unwrap();

        signal_hook::low_level::raise(SIGTERM).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), cancel.cancelled())
            .await
            .expect("SIGTERM 应触发取消");
    }
}
