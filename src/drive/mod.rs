// 云盘API模块

pub mod client;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use client::DriveClient;
pub use types::{dedup_by_id, escape_query, DriveEntry, DriveFileMeta, FOLDER_MIME_TYPE};

/// 云盘读取能力
///
/// 代理端点只依赖该接口，具体客户端由宿主进程在启动时注入，
/// 测试中可替换为内存实现
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// 列出文件夹的直接子项（仅文件夹和图片），按 id 去重
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveEntry>>;

    /// 在整个共享云盘内按名称搜索图片，按修改时间倒序，按 id 去重
    async fn search_images(&self, text: &str) -> Result<Vec<DriveEntry>>;

    /// 获取单个文件的元数据（名称与 MIME 类型）
    async fn file_metadata(&self, file_id: &str) -> Result<DriveFileMeta>;

    /// 下载文件原始内容
    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}
