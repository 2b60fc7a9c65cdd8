//! 主机探测模块
//!
//! 提供单主机探测、有界并发分发和周期调度功能

pub mod dispatcher;
pub mod echo;
pub mod prober;
pub mod result;
pub mod scheduler;

// 重新导出主要类型
pub use dispatcher::Dispatcher;
pub use echo::{EchoRequester, SystemPing};
pub use prober::{prober_for, IcmpProber, Prober, TcpProber, CANCELLED_DETAIL};
pub use result::{CycleReport, CycleSummary, ProbeResult, Protocol};
pub use scheduler::{RunSummary, Scheduler, SchedulerState, StopReason};
