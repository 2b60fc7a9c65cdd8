//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换、主机列表文件读取以及配置合并

use crate::config::types::{ConfigOverrides, FileConfig, RunConfig};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 配置文件名
const CONFIG_FILE_NAME: &str = "host-vitals.toml";

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<FileConfig>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<FileConfig>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    ///
    /// # 返回
    /// * `Result<FileConfig>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str) -> Result<FileConfig>;

    /// 验证配置
    fn validate(&self, config: &FileConfig) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的 `${VAR_NAME}` 环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<FileConfig> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: FileConfig = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;

        Ok(config)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<FileConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {e}")))?;

        let mut config = self.parse_toml(&content)?;
        self.validate(&config)?;

        // 相对路径的主机列表文件以配置文件所在目录为基准
        if let (Some(hosts_file), Some(parent)) = (config.hosts_file.as_ref(), path.parent()) {
            if hosts_file.is_relative() {
                config.hosts_file = Some(parent.join(hosts_file));
            }
        }

        tracing::info!("成功加载配置文件: {}", path.display());
        tracing::debug!("配置内容: {:?}", config);

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<FileConfig> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;

        tracing::debug!("成功解析配置字符串");

        Ok(config)
    }

    fn validate(&self, config: &FileConfig) -> Result<()> {
        if config.concurrency == Some(0) {
            return Err(ConfigError::ValidationError("concurrency 不能为0".to_string()).into());
        }
        if config.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::ValidationError("timeout 不能为0".to_string()).into());
        }
        Ok(())
    }
}

/// 解析主机列表文本
///
/// 每行一个主机，忽略空行和以 `#` 开头的注释行，去除首尾空白。
pub fn parse_hosts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// 读取主机列表文件
pub async fn load_hosts_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
        } else {
            ConfigError::ParseError(format!("读取主机列表文件 {} 失败: {e}", path.display()))
        }
    })?;

    let hosts = parse_hosts(&content);
    tracing::debug!("从 {} 读取到 {} 个主机", path.display(), hosts.len());
    Ok(hosts)
}

/// 加载配置文件
///
/// 显式指定的路径必须存在；未指定时使用默认路径，默认文件不存在则返回空配置。
pub async fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let loader = TomlConfigLoader::new(true);

    match explicit_path {
        Some(path) => loader.load_from_file(path).await,
        None => match get_default_config_path() {
            Some(path) => loader.load_from_file(path).await,
            None => Ok(FileConfig::default()),
        },
    }
}

/// 合并配置文件与命令行覆盖项，生成已验证的运行配置
///
/// 命令行指定了主机（参数或 -f）时只使用命令行的主机，否则使用配置文件中的主机。
pub async fn resolve_run_config(file: FileConfig, overrides: ConfigOverrides) -> Result<RunConfig> {
    let defaults = RunConfig::default();

    let hosts = if overrides.has_hosts() {
        collect_hosts(overrides.hosts, overrides.hosts_file.as_deref()).await?
    } else {
        collect_hosts(file.hosts, file.hosts_file.as_deref()).await?
    };

    let config = RunConfig {
        hosts,
        concurrency_limit: overrides
            .concurrency
            .or(file.concurrency)
            .unwrap_or(defaults.concurrency_limit),
        probe_timeout: overrides
            .timeout
            .or(file.timeout)
            .unwrap_or(defaults.probe_timeout),
        protocol: overrides
            .protocol
            .or(file.protocol)
            .unwrap_or(defaults.protocol),
        interval: overrides
            .interval
            .or(file.interval)
            .unwrap_or(defaults.interval),
        repeat_count: overrides.count.or(file.count).unwrap_or(defaults.repeat_count),
        format: overrides.format.or(file.format).unwrap_or(defaults.format),
    };

    config.validate()?;
    Ok(config)
}

/// 合并内联主机与主机列表文件，内联主机在前
async fn collect_hosts(mut hosts: Vec<String>, hosts_file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = hosts_file {
        hosts.extend(load_hosts_file(path).await?);
    }
    Ok(hosts)
}

/// 获取默认配置文件路径
///
/// 依次检查当前目录下的 `host-vitals.toml` 和用户配置目录下的
/// `host-vitals/config.toml`，都不存在时返回 `None`。
pub fn get_default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join("host-vitals").join("config.toml"))
        .filter(|path| path.exists())
}
