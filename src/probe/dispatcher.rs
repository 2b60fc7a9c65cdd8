//! 探测分发器
//!
//! 在并发上限内为每个主机启动一个探测任务，等待全部完成后汇总结果

use crate::probe::prober::Prober;
use crate::probe::result::{CycleReport, ProbeResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// 探测分发器
///
/// 通过信号量控制并发：只有拿到许可的主机才会被派发，
/// 每个许可在对应探测结束时归还。
pub struct Dispatcher {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 单次探测超时时间
    probe_timeout: Duration,
}

impl Dispatcher {
    /// 创建新的分发器
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `probe_timeout` - 单次探测超时时间
    pub fn new(prober: Arc<dyn Prober>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            probe_timeout,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// 执行一轮探测
    ///
    /// 每个主机在派发前检查取消信号，已取消则跳过该主机及其后所有主机；
    /// 已经开始的探测会运行到结束或超时。函数只在所有已派发探测结束后返回。
    ///
    /// # 参数
    /// * `hosts` - 主机列表
    /// * `concurrency_limit` - 同时进行的探测数量上限
    /// * `cancel` - 取消信号
    ///
    /// # 返回
    /// * `CycleReport` - 按输入顺序排列的探测结果
    pub async fn run_cycle(
        &self,
        hosts: &[String],
        concurrency_limit: usize,
        cancel: &CancellationToken,
    ) -> CycleReport {
        let started_at = Utc::now();
        let start = Instant::now();

        if concurrency_limit == 0 {
            warn!("并发上限为0，按1处理");
        }
        let semaphore = Arc::new(Semaphore::new(concurrency_limit.max(1)));
        let mut tasks = JoinSet::new();
        let mut skipped = 0;

        for (index, host) in hosts.iter().enumerate() {
            // 等待空闲槽位，等待期间收到取消则不再派发
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };

            let Some(permit) = permit.filter(|_| !cancel.is_cancelled()) else {
                skipped = hosts.len() - index;
                debug!("已取消，跳过剩余 {} 个主机", skipped);
                break;
            };

            let prober = Arc::clone(&self.prober);
            let cancel = cancel.clone();
            let host = host.clone();
            let probe_timeout = self.probe_timeout;

            tasks.spawn(async move {
                let _permit = permit;
                let result = prober.probe(&host, probe_timeout, &cancel).await;
                (index, result)
            });
        }

        let mut collected: Vec<(usize, ProbeResult)> = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    debug!(
                        "探测完成: {} reachable={}",
                        result.host(),
                        result.is_reachable()
                    );
                    collected.push((index, result));
                }
                Err(e) => {
                    error!("探测任务异常退出: {}", e);
                }
            }
        }

        collected.sort_by_key(|(index, _)| *index);
        let results = collected.into_iter().map(|(_, result)| result).collect();

        CycleReport::new(results, skipped, started_at, start.elapsed())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("protocol", &self.prober.protocol())
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}
