//! 调度器集成测试
//!
//! 测试周期检测的轮次上限和取消响应

mod common;

use common::{hosts, DelayProber};
use host_vitals::config::RunConfig;
use host_vitals::probe::{Scheduler, SchedulerState, StopReason};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn repeating_config(interval: Duration, repeat_count: u64) -> RunConfig {
    RunConfig {
        hosts: hosts(&["a:1", "b:1"]),
        interval,
        repeat_count,
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn test_repeat_count_stops_after_exact_cycles() {
    let prober = Arc::new(DelayProber::new(Duration::from_millis(5)));
    let config = repeating_config(Duration::from_millis(50), 3);
    let mut scheduler = Scheduler::new(&config, prober.clone(), CancellationToken::new());

    let mut cycles = Vec::new();
    let summary = scheduler.run(|report| cycles.push(report.cycle())).await;

    assert_eq!(cycles, vec![1, 2, 3]);
    assert_eq!(summary.cycles_completed, 3);
    assert_eq!(summary.stop_reason, StopReason::Completed);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(prober.calls(), 6);
}

#[tokio::test]
async fn test_cancel_while_waiting_returns_promptly() {
    let prober = Arc::new(DelayProber::new(Duration::from_millis(5)));
    let config = repeating_config(Duration::from_secs(30), 0);
    let cancel = CancellationToken::new();
    let mut scheduler = Scheduler::new(&config, prober.clone(), cancel.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let start = Instant::now();
    let summary = tokio::time::timeout(Duration::from_secs(2), scheduler.run(|_| {}))
        .await
        .expect("调度器应及时响应取消");

    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(summary.cycles_completed, 0);
    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn test_cancel_mid_cycle_finishes_cycle_then_stops() {
    let prober = Arc::new(DelayProber::new(Duration::from_millis(200)));
    let config = RunConfig {
        hosts: hosts(&["a:1", "b:1", "c:1"]),
        concurrency_limit: 1,
        ..RunConfig::default()
    };
    let cancel = CancellationToken::new();
    let mut scheduler = Scheduler::new(&config, prober, cancel.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let mut reports = Vec::new();
    let summary = scheduler
        .run(|report| reports.push((report.len(), report.skipped())))
        .await;

    assert_eq!(reports, vec![(1, 2)]);
    assert_eq!(summary.cycles_completed, 1);
    assert_eq!(summary.stop_reason, StopReason::Cancelled);
}

#[tokio::test]
async fn test_single_run_ignores_repeat_count() {
    let prober = Arc::new(DelayProber::new(Duration::from_millis(1)));
    let config = repeating_config(Duration::ZERO, 5);
    let mut scheduler = Scheduler::new(&config, prober, CancellationToken::new());

    let summary = scheduler.run(|_| {}).await;

    assert_eq!(summary.cycles_completed, 1);
    assert_eq!(summary.stop_reason, StopReason::Completed);
}

#[tokio::test]
async fn test_stopped_scheduler_cannot_be_restarted() {
    let prober = Arc::new(DelayProber::new(Duration::from_millis(1)));
    let config = repeating_config(Duration::from_millis(20), 2);
    let mut scheduler = Scheduler::new(&config, prober.clone(), CancellationToken::new());

    let first = scheduler.run(|_| {}).await;
    let second = scheduler.run(|_| {}).await;

    assert_eq!(first.cycles_completed, 2);
    assert_eq!(second.cycles_completed, 2);
    assert_eq!(second.stop_reason, StopReason::Completed);
    assert_eq!(prober.calls(), 4);
}
