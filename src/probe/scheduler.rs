//! 检测调度器模块
//!
//! 驱动分发器执行单轮或周期性检测，支持轮次上限和及时响应取消信号

use crate::config::RunConfig;
use crate::probe::dispatcher::Dispatcher;
use crate::probe::prober::Prober;
use crate::probe::result::CycleReport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 尚未启动
    Idle,
    /// 正在执行一轮检测
    Running,
    /// 等待下一次触发
    Waiting,
    /// 已停止（终态）
    Stopped,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "空闲"),
            SchedulerState::Running => write!(f, "运行中"),
            SchedulerState::Waiting => write!(f, "等待中"),
            SchedulerState::Stopped => write!(f, "已停止"),
        }
    }
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 单轮完成或达到轮次上限
    Completed,
    /// 收到取消信号
    Cancelled,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// 完成的轮数
    pub cycles_completed: u64,
    /// 停止原因
    pub stop_reason: StopReason,
}

/// 检测调度器
pub struct Scheduler {
    /// 分发器
    dispatcher: Dispatcher,
    /// 主机列表
    hosts: Vec<String>,
    /// 并发上限
    concurrency_limit: usize,
    /// 检测间隔，为0时只执行一轮
    interval: Duration,
    /// 轮次上限，为0时不限
    repeat_count: u64,
    /// 取消信号
    cancel: CancellationToken,
    /// 当前状态
    state: SchedulerState,
    /// 已完成轮数
    cycles_completed: u64,
    /// 停止原因，停止后才有值
    stop_reason: Option<StopReason>,
}

impl Scheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    /// * `config` - 已验证的运行配置
    /// * `prober` - 探测器
    /// * `cancel` - 进程级取消信号
    pub fn new(config: &RunConfig, prober: Arc<dyn Prober>, cancel: CancellationToken) -> Self {
        Self {
            dispatcher: Dispatcher::new(prober, config.probe_timeout),
            hosts: config.hosts.clone(),
            concurrency_limit: config.concurrency_limit,
            interval: config.interval,
            repeat_count: config.repeat_count,
            cancel,
            state: SchedulerState::Idle,
            cycles_completed: 0,
            stop_reason: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// 运行调度器直到停止
    ///
    /// 每轮结束后调用 `on_report`，返回时状态为 [`SchedulerState::Stopped`]。
    /// 停止是终态，再次调用直接返回上一次的汇总，不会执行新的检测。
    pub async fn run<F>(&mut self, mut on_report: F) -> RunSummary
    where
        F: FnMut(&CycleReport),
    {
        if let (SchedulerState::Stopped, Some(stop_reason)) = (self.state, self.stop_reason) {
            debug!("调度器已停止，忽略重复启动");
            return RunSummary {
                cycles_completed: self.cycles_completed,
                stop_reason,
            };
        }

        let stop_reason = if self.interval.is_zero() {
            self.run_once(&mut on_report).await
        } else {
            self.run_repeating(&mut on_report).await
        };

        self.state = SchedulerState::Stopped;
        self.stop_reason = Some(stop_reason);
        info!(
            "调度器已停止，完成 {} 轮，原因: {:?}",
            self.cycles_completed, stop_reason
        );

        RunSummary {
            cycles_completed: self.cycles_completed,
            stop_reason,
        }
    }

    async fn run_once<F>(&mut self, on_report: &mut F) -> StopReason
    where
        F: FnMut(&CycleReport),
    {
        self.execute_cycle(on_report).await;

        if self.cancel.is_cancelled() {
            StopReason::Cancelled
        } else {
            StopReason::Completed
        }
    }

    async fn run_repeating<F>(&mut self, on_report: &mut F) -> StopReason
    where
        F: FnMut(&CycleReport),
    {
        // 第一轮在一个间隔之后触发，慢轮次之后不补发积压的触发
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = self.cancel.clone();

        loop {
            self.state = SchedulerState::Waiting;

            let cancelled = tokio::select! {
                biased;
                _ = cancel.cancelled() => true,
                _ = ticker.tick() => false,
            };
            if cancelled {
                info!("收到取消信号，停止等待下一轮检测");
                return StopReason::Cancelled;
            }

            self.execute_cycle(on_report).await;

            if self.repeat_count > 0 && self.cycles_completed >= self.repeat_count {
                debug!("已达到检测轮数上限: {}", self.repeat_count);
                return StopReason::Completed;
            }
        }
    }

    /// 执行一轮检测并交给回调
    async fn execute_cycle<F>(&mut self, on_report: &mut F)
    where
        F: FnMut(&CycleReport),
    {
        self.state = SchedulerState::Running;
        let cycle = self.cycles_completed + 1;
        debug!("开始第 {} 轮检测，主机数量: {}", cycle, self.hosts.len());

        let report = self
            .dispatcher
            .run_cycle(&self.hosts, self.concurrency_limit, &self.cancel)
            .await
            .with_cycle(cycle);

        info!(
            "第 {} 轮检测完成，耗时 {}ms，{}",
            cycle,
            report.elapsed().as_millis(),
            report.summary()
        );

        on_report(&report);
        self.cycles_completed = cycle;
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("dispatcher", &self.dispatcher)
            .field("hosts", &self.hosts.len())
            .field("concurrency_limit", &self.concurrency_limit)
            .field("interval", &self.interval)
            .field("repeat_count", &self.repeat_count)
            .field("state", &self.state)
            .field("cycles_completed", &self.cycles_completed)
            .field("stop_reason", &self.stop_reason)
            .finish()
    }
}
