//! Host Vitals - 有界并发的主机可达性检测工具
//!
//! 对一组主机执行TCP连接或ICMP回显探测，支持：
//! - 有界并发分发，结果按输入顺序输出
//! - 单轮检测或按固定间隔周期检测
//! - JSON与彩色文本两种输出格式
//! - 中断信号触发的优雅停止
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod reporter;
pub mod shutdown;

// 重新导出主要类型
pub use config::RunConfig;
pub use error::HostVitalsError;
pub use probe::{CycleReport, Dispatcher, ProbeResult, Prober, Protocol, Scheduler};
pub use reporter::{ReportFormat, Reporter};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
