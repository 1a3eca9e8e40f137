// 配置管理模块

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 云盘配置
    pub drive: DriveConfig,
    /// 对象存储配置
    pub storage: StorageConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS允许的源（空表示允许所有）
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    18080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// 云盘配置
///
/// 浏览和搜索都被限定在单个共享云盘范围内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// 服务账号密钥文件路径（JSON格式）
    #[serde(default = "default_service_account_key")]
    pub service_account_key: PathBuf,
    /// 共享云盘ID（同时作为浏览的根目录）
    #[serde(default)]
    pub shared_drive_id: String,
}

fn default_service_account_key() -> PathBuf {
    PathBuf::from("config/service-account.json")
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            service_account_key: default_service_account_key(),
            shared_drive_id: String::new(),
        }
    }
}

/// 对象存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 存储服务地址（如 https://xxxx.supabase.co）
    #[serde(default)]
    pub endpoint: String,
    /// 存储桶名称
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// 服务密钥（service role key）
    #[serde(default)]
    pub service_key: String,
}

fn default_bucket() -> String {
    "property-images".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: default_bucket(),
            service_key: String::new(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_enabled() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            drive: DriveConfig::default(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        tracing::info!("✓ 配置已保存: {}", path);
        Ok(())
    }

    /// 加载或创建默认配置
    pub async fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {}", e);
                let default_config = Self::default();

                // 尝试保存默认配置，方便用户首次启动后填写
                if let Err(e) = default_config.save_to_file(path).await {
                    tracing::error!("保存默认配置失败: {}", e);
                }

                default_config
            }
        }
    }

    /// 校验启动所必需的外部服务配置
    ///
    /// 共享云盘ID、存储服务地址和服务密钥缺一不可
    pub fn validate(&self) -> Result<()> {
        if self.drive.shared_drive_id.is_empty() {
            anyhow::bail!(
                "缺少共享云盘ID，请在配置文件的 [drive] 段填写 shared_drive_id"
            );
        }
        if self.storage.endpoint.is_empty() {
            anyhow::bail!("缺少存储服务地址，请在配置文件的 [storage] 段填写 endpoint");
        }
        if self.storage.service_key.is_empty() {
            anyhow::bail!("缺少存储服务密钥，请在配置文件的 [storage] 段填写 service_key");
        }
        Ok(())
    }
}
