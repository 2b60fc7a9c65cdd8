//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Host Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum HostVitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 输出渲染相关错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 时间间隔格式错误
    #[error("无效的时间间隔 '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },
}

/// 输出渲染错误类型
#[derive(Error, Debug)]
pub enum RenderError {
    /// 序列化失败
    #[error("结果序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 写入输出流失败
    #[error("写入输出失败: {0}")]
    Write(#[from] std::io::Error),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, HostVitalsError>;
