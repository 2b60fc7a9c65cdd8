//! 探测结果数据结构
//!
//! 定义单次探测结果、单轮检测报告以及统计摘要

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 探测协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP 连接探测
    Tcp,
    /// ICMP 回显探测
    Icmp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Icmp => write!(f, "icmp"),
        }
    }
}

/// 单个主机的探测结果
///
/// 可达时只携带延迟，不可达时只携带错误详情，两者互斥。
/// 字段私有，只能通过 [`ProbeResult::reachable`] 与 [`ProbeResult::unreachable`] 构造。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    host: String,
    protocol: Protocol,
    reachable: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "latency_millis::serialize"
    )]
    latency: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    observed_at: DateTime<Utc>,
}

impl ProbeResult {
    /// 创建可达结果，延迟按毫秒四舍五入
    pub fn reachable(host: impl Into<String>, protocol: Protocol, latency: Duration) -> Self {
        Self {
            host: host.into(),
            protocol,
            reachable: true,
            latency: Some(round_to_millis(latency)),
            error_detail: None,
            observed_at: Utc::now(),
        }
    }

    /// 创建不可达结果
    pub fn unreachable(
        host: impl Into<String>,
        protocol: Protocol,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            protocol,
            reachable: false,
            latency: None,
            error_detail: Some(error_detail.into()),
            observed_at: Utc::now(),
        }
    }

    /// 设置观测时间（探测开始时刻）
    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// 延迟（仅可达时存在）
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// 延迟（毫秒）
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency.map(|latency| latency.as_millis() as u64)
    }

    /// 错误详情（仅不可达时存在）
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 将时长四舍五入到毫秒精度
pub fn round_to_millis(duration: Duration) -> Duration {
    let millis = (duration.as_nanos() + 500_000) / 1_000_000;
    Duration::from_millis(millis as u64)
}

/// 延迟序列化为整数毫秒
mod latency_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(latency: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match latency {
            Some(latency) => serializer.serialize_u64(latency.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }
}

/// 单轮检测报告
///
/// 结果按主机在输入列表中的顺序排列；因取消而跳过的主机不产生结果。
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 轮次编号（从1开始）
    cycle: u64,
    /// 本轮开始时间
    started_at: DateTime<Utc>,
    /// 本轮总耗时
    elapsed: Duration,
    /// 探测结果
    results: Vec<ProbeResult>,
    /// 因取消而跳过的主机数
    skipped: usize,
}

impl CycleReport {
    pub fn new(
        results: Vec<ProbeResult>,
        skipped: usize,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            cycle: 1,
            started_at,
            elapsed,
            results,
            skipped,
        }
    }

    /// 设置轮次编号
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 计算本轮统计摘要
    pub fn summary(&self) -> CycleSummary {
        let mut summary = CycleSummary {
            skipped: self.skipped,
            ..CycleSummary::default()
        };
        for result in &self.results {
            summary.update(result);
        }
        summary
    }
}

/// 单轮检测统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleSummary {
    /// 已探测主机数
    pub total: usize,
    /// 可达主机数
    pub reachable: usize,
    /// 不可达主机数
    pub unreachable: usize,
    /// 跳过的主机数
    pub skipped: usize,
    /// 平均延迟（毫秒）
    pub average_latency_ms: Option<f64>,
    /// 最小延迟（毫秒）
    pub min_latency_ms: Option<u64>,
    /// 最大延迟（毫秒）
    pub max_latency_ms: Option<u64>,
}

impl CycleSummary {
    /// 累加一个探测结果
    pub fn update(&mut self, result: &ProbeResult) {
        self.total += 1;

        let Some(latency_ms) = result.latency_ms() else {
            self.unreachable += 1;
            return;
        };

        self.reachable += 1;
        self.min_latency_ms = Some(self.min_latency_ms.map_or(latency_ms, |m| m.min(latency_ms)));
        self.max_latency_ms = Some(self.max_latency_ms.map_or(latency_ms, |m| m.max(latency_ms)));

        // 增量计算平均延迟
        let previous = self.average_latency_ms.unwrap_or(0.0);
        let count = self.reachable as f64;
        self.average_latency_ms = Some(previous + (latency_ms as f64 - previous) / count);
    }

    /// 全部可达
    pub fn all_reachable(&self) -> bool {
        self.unreachable == 0
    }
}

impl std::fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "可达 {}/{}，跳过 {}",
            self.reachable, self.total, self.skipped
        )?;
        if let Some(avg) = self.average_latency_ms {
            write!(f, "，平均延迟 {avg:.1}ms")?;
        }
        Ok(())
    }
}
