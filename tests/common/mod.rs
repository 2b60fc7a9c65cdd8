//! 集成测试共用的探测器替身

#![allow(dead_code)]

use async_trait::async_trait;
use host_vitals::probe::{ProbeResult, Prober, Protocol};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 固定延迟的探测器，记录调用次数和同时在途的最大探测数
pub struct DelayProber {
    pub delay: Duration,
    pub protocol: Protocol,
    pub unreachable: HashSet<String>,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub probed: Mutex<Vec<String>>,
}

impl DelayProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            protocol: Protocol::Tcp,
            unreachable: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_unreachable(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// 按开始顺序记录的已探测主机
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for DelayProber {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn probe(
        &self,
        host: &str,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(host.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.unreachable.contains(host) {
            ProbeResult::unreachable(host, self.protocol, "TCP unreachable: connection refused")
        } else {
            ProbeResult::reachable(host, self.protocol, self.delay)
        }
    }
}

pub fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
