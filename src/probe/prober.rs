//! 主机探测器实现
//!
//! 提供 TCP 连接探测和 ICMP 回显探测，每次探测都受独立的超时约束

use crate::probe::echo::{EchoRequester, SystemPing};
use crate::probe::result::{ProbeResult, Protocol};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// 探测开始前已收到取消信号时的错误详情
pub const CANCELLED_DETAIL: &str = "probe cancelled before start";

/// 探测器trait，定义单次探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 探测器使用的协议
    fn protocol(&self) -> Protocol;

    /// 对单个主机执行一次探测
    ///
    /// 任何失败都体现为不可达结果，不会返回错误。
    ///
    /// # 参数
    /// * `host` - 目标主机
    /// * `timeout` - 从探测开始计时的超时时间
    /// * `cancel` - 取消信号，开始前已触发则不进行网络操作
    ///
    /// # 返回
    /// * `ProbeResult` - 探测结果
    async fn probe(&self, host: &str, timeout: Duration, cancel: &CancellationToken)
        -> ProbeResult;
}

/// 根据协议创建默认探测器
pub fn prober_for(protocol: Protocol) -> Arc<dyn Prober> {
    match protocol {
        Protocol::Tcp => Arc::new(TcpProber),
        Protocol::Icmp => Arc::new(IcmpProber::default()),
    }
}

/// 拆分 `host:port` 形式的地址
///
/// IPv6 地址需要使用方括号，例如 `[::1]:22`。
pub fn split_host_port(target: &str) -> Result<(&str, u16), String> {
    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| format!("address {target}: missing port in address"))?;

    if host.is_empty() {
        return Err(format!("address {target}: missing host in address"));
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(format!("address {target}: too many colons in address"));
    }

    let port = port
        .parse::<u16>()
        .map_err(|_| format!("address {target}: invalid port"))?;

    Ok((host, port))
}

/// TCP 连接探测器
///
/// 建立连接即视为可达，连接在返回前关闭。
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(
        &self,
        host: &str,
        timeout_duration: Duration,
        cancel: &CancellationToken,
    ) -> ProbeResult {
        let observed_at = Utc::now();

        if cancel.is_cancelled() {
            return ProbeResult::unreachable(host, Protocol::Tcp, CANCELLED_DETAIL)
                .with_observed_at(observed_at);
        }

        if let Err(detail) = split_host_port(host) {
            return ProbeResult::unreachable(host, Protocol::Tcp, format!("TCP unreachable: {detail}"))
                .with_observed_at(observed_at);
        }

        let start = Instant::now();
        let result = match connect_within(TcpStream::connect(host), timeout_duration).await {
            Ok(latency) => ProbeResult::reachable(host, Protocol::Tcp, latency),
            Err(detail) => ProbeResult::unreachable(host, Protocol::Tcp, detail),
        };

        trace!("TCP 探测完成: {} ({:?})", host, start.elapsed());
        result.with_observed_at(observed_at)
    }
}

/// 在超时内等待连接建立，成功时返回耗时并立即关闭连接
async fn connect_within<F, S>(connect: F, timeout_duration: Duration) -> Result<Duration, String>
where
    F: Future<Output = std::io::Result<S>>,
{
    let start = Instant::now();
    match timeout(timeout_duration, connect).await {
        Ok(Ok(stream)) => {
            let latency = start.elapsed();
            drop(stream);
            Ok(latency)
        }
        Ok(Err(e)) => Err(format!("TCP unreachable: {e}")),
        Err(_) => Err(format!(
            "TCP unreachable: connect timed out after {}",
            humantime::format_duration(timeout_duration)
        )),
    }
}

/// ICMP 回显探测器
pub struct IcmpProber {
    /// 回显请求实现
    echo: Arc<dyn EchoRequester>,
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self::new(Arc::new(SystemPing::default()))
    }
}

impl IcmpProber {
    /// 使用指定的回显实现创建探测器
    pub fn new(echo: Arc<dyn EchoRequester>) -> Self {
        Self { echo }
    }

    /// 校验 ICMP 目标，拒绝会被解释为命令行选项的主机名
    fn validate_target(host: &str) -> Result<(), String> {
        let host = host.trim();
        if host.is_empty() {
            return Err("empty host".to_string());
        }
        if host.starts_with('-') {
            return Err(format!("invalid host: {host}"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for IcmpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcmpProber").finish_non_exhaustive()
    }
}

#[async_trait]
impl Prober for IcmpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Icmp
    }

    async fn probe(
        &self,
        host: &str,
        timeout_duration: Duration,
        cancel: &CancellationToken,
    ) -> ProbeResult {
        let observed_at = Utc::now();

        if cancel.is_cancelled() {
            return ProbeResult::unreachable(host, Protocol::Icmp, CANCELLED_DETAIL)
                .with_observed_at(observed_at);
        }

        if let Err(detail) = Self::validate_target(host) {
            return ProbeResult::unreachable(host, Protocol::Icmp, format!("ICMP unreachable: {detail}"))
                .with_observed_at(observed_at);
        }

        let start = Instant::now();
        // 外部实现未必遵守超时，这里再加一层
        let result = match timeout(timeout_duration, self.echo.echo(host, timeout_duration)).await
        {
            Ok(Ok(())) => ProbeResult::reachable(host, Protocol::Icmp, start.elapsed()),
            Ok(Err(detail)) => {
                ProbeResult::unreachable(host, Protocol::Icmp, format!("ICMP unreachable: {detail}"))
            }
            Err(_) => ProbeResult::unreachable(
                host,
                Protocol::Icmp,
                format!(
                    "ICMP unreachable: no reply within {}",
                    humantime::format_duration(timeout_duration)
                ),
            ),
        };

        result.with_observed_at(observed_at)
    }
}
