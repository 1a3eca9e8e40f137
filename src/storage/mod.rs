// 对象存储模块

pub mod client;

use anyhow::Result;
use async_trait::async_trait;

pub use client::StorageClient;

/// 对象存储写入能力
///
/// 上传代理只依赖该接口，具体客户端由宿主进程在启动时注入
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// 将对象写入存储桶指定路径
    async fn upload_object(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;

    /// 解析对象的公开访问地址
    fn public_url(&self, path: &str) -> String;
}
