// 应用状态

use crate::auth::ServiceAccountKey;
use crate::config::AppConfig;
use crate::drive::{DriveApi, DriveClient};
use crate::storage::{StorageApi, StorageClient};
use std::sync::Arc;

/// 应用全局状态
///
/// 云盘和存储以能力接口的形式注入，凭证在启动时一次性加载，
/// 之后所有请求共享同一组客户端
#[derive(Clone)]
pub struct AppState {
    /// 云盘读取能力
    pub drive: Arc<dyn DriveApi>,
    /// 对象存储写入能力
    pub storage: Arc<dyn StorageApi>,
    /// 应用配置
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 创建新的应用状态
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::load_or_default("config/app.toml").await;
        config.validate()?;

        let key = ServiceAccountKey::load_from_file(&config.drive.service_account_key).await?;
        let drive = DriveClient::new(key, config.drive.shared_drive_id.clone())?;

        let storage = StorageClient::new(
            config.storage.endpoint.clone(),
            config.storage.bucket.clone(),
            config.storage.service_key.clone(),
        )?;

        Ok(Self::with_clients(
            Arc::new(drive),
            Arc::new(storage),
            Arc::new(config),
        ))
    }

    /// 以注入的能力构造状态（测试中传入内存实现）
    pub fn with_clients(
        drive: Arc<dyn DriveApi>,
        storage: Arc<dyn StorageApi>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            drive,
            storage,
            config,
        }
    }
}
