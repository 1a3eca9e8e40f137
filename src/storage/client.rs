// 对象存储客户端实现
//
// 对接 Supabase Storage 的 REST 接口：写入对象后，
// 公开地址可由桶名和路径直接拼出，无需再次请求

use crate::storage::StorageApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// 对象存储客户端
#[derive(Clone)]
pub struct StorageClient {
    /// HTTP客户端
    client: reqwest::Client,
    /// 存储服务地址
    endpoint: String,
    /// 存储桶名称
    bucket: String,
    /// 服务密钥
    service_key: String,
}

impl StorageClient {
    /// 创建新的对象存储客户端
    ///
    /// # 参数
    /// * `endpoint` - 存储服务地址（不含末尾斜杠）
    /// * `bucket` - 存储桶名称
    /// * `service_key` - 服务密钥
    pub fn new(endpoint: String, bucket: String, service_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = endpoint.trim_end_matches('/').to_string();

        info!("初始化对象存储客户端成功, endpoint={}, bucket={}", endpoint, bucket);

        Ok(Self {
            client,
            endpoint,
            bucket,
            service_key,
        })
    }

    /// 按路径分段做 URL 编码，保留分隔用的斜杠
    fn encode_path(path: &str) -> String {
        path.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// 对象写入接口地址
    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.endpoint,
            self.bucket,
            Self::encode_path(path)
        )
    }
}

#[async_trait]
impl StorageApi for StorageClient {
    async fn upload_object(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        info!(
            "写入对象: path={}, content_type={}, {} 字节",
            path,
            content_type,
            bytes.len()
        );

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .context("Failed to upload object")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("对象写入失败: {} - {}", status, error_text);
        }

        debug!("对象写入成功: {}", path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.endpoint,
            self.bucket,
            Self::encode_path(path)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StorageClient {
        StorageClient::new(
            "https://demo.supabase.co".to_string(),
            "property-images".to_string(),
            "sk-test".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_public_url() {
        let client = test_client();
        assert_eq!(
            client.public_url("properties/p1/123-a.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/property-images/properties/p1/123-a.jpg"
        );
    }

    #[test]
    fn test_encode_path_preserves_slashes() {
        assert_eq!(
            StorageClient::encode_path("properties/p1/123-my photo.jpg"),
            "properties/p1/123-my%20photo.jpg"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = StorageClient::new(
            "https://demo.supabase.co/".to_string(),
            "property-images".to_string(),
            "sk-test".to_string(),
        )
        .unwrap();
        assert!(client
            .public_url("a.jpg")
            .starts_with("https://demo.supabase.co/storage/"));
    }
}
