//! 结果输出模块
//!
//! 将单轮检测报告渲染为JSON数组或逐行文本，并写入输出流

use crate::error::RenderError;
use crate::probe::{CycleReport, ProbeResult};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::error;

/// 报告格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// 逐行文本
    #[default]
    Text,
    /// 每轮一行JSON数组
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// 报告输出器
pub struct Reporter<W: Write> {
    /// 输出格式
    format: ReportFormat,
    /// 输出流
    writer: W,
}

impl<W: Write> Reporter<W> {
    /// 创建新的输出器
    pub fn new(format: ReportFormat, writer: W) -> Self {
        Self { format, writer }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// 取回输出流
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// 渲染报告
    ///
    /// # 参数
    /// * `report` - 单轮检测报告
    /// * `format` - 输出格式
    ///
    /// # 返回
    /// * `Result<String, RenderError>` - 渲染后的文本，以换行结尾
    pub fn render(report: &CycleReport, format: ReportFormat) -> Result<String, RenderError> {
        match format {
            ReportFormat::Json => {
                let mut out = serde_json::to_string(report.results())?;
                out.push('\n');
                Ok(out)
            }
            ReportFormat::Text => Ok(report
                .results()
                .iter()
                .map(|result| format!("{}\n", render_line(result)))
                .collect()),
        }
    }

    /// 渲染并写入报告
    pub fn emit(&mut self, report: &CycleReport) -> Result<(), RenderError> {
        let rendered = Self::render(report, self.format)?;
        self.writer.write_all(rendered.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// 渲染并写入报告，失败时只记录日志
    pub fn report(&mut self, report: &CycleReport) {
        if let Err(e) = self.emit(report) {
            error!("输出第 {} 轮检测结果失败: {}", report.cycle(), e);
        }
    }
}

/// 渲染单个结果为一行文本
fn render_line(result: &ProbeResult) -> String {
    match result.latency_ms() {
        Some(latency_ms) if result.is_reachable() => format!(
            "✓ {} is reachable via {} (latency: {}ms)",
            result.host(),
            result.protocol(),
            latency_ms
        )
        .green()
        .to_string(),
        _ => format!(
            "✗ {} is unreachable via {}: {}",
            result.host(),
            result.protocol(),
            result.error_detail().unwrap_or("unknown error")
        )
        .red()
        .to_string(),
    }
}
