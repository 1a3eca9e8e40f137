// 选择器后端
//
// 状态机通过该接口访问三个代理端点，测试中可替换为内存实现

use crate::drive::DriveEntry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// 代理端点访问能力
#[async_trait]
pub trait PickerBackend: Send + Sync {
    /// 列出文件夹内容（None 表示根）
    async fn list(&self, folder_id: Option<&str>) -> Result<Vec<DriveEntry>>;

    /// 按名称搜索图片
    async fn search(&self, text: &str) -> Result<Vec<DriveEntry>>;

    /// 转存图片到对象存储，返回公开地址
    async fn upload(&self, file_id: &str, property_id: &str) -> Result<String>;
}

/// 列表/搜索响应体
#[derive(Debug, Deserialize)]
struct FilesBody {
    files: Vec<DriveEntry>,
}

/// 转存响应体
#[derive(Debug, Deserialize)]
struct UploadBody {
    url: String,
}

/// 错误响应体
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// 通过 HTTP 访问代理端点的后端
#[derive(Clone)]
pub struct HttpBackend {
    /// HTTP客户端
    client: reqwest::Client,
    /// 服务基地址（不含末尾斜杠）
    base_url: String,
}

impl HttpBackend {
    /// 创建新的 HTTP 后端
    ///
    /// # 参数
    /// * `base_url` - 代理服务基地址（如 http://127.0.0.1:18080）
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 失败响应还原成错误，保留服务端给出的 error 信息
    async fn read_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => anyhow::anyhow!(body.error),
            Err(_) => anyhow::anyhow!("请求失败: {}", status),
        }
    }
}

#[async_trait]
impl PickerBackend for HttpBackend {
    async fn list(&self, folder_id: Option<&str>) -> Result<Vec<DriveEntry>> {
        let mut request = self.client.get(self.endpoint("/api/v1/drive/list"));
        if let Some(id) = folder_id {
            request = request.query(&[("folderId", id)]);
        }

        let response = request.send().await.context("Failed to request listing")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: FilesBody = response
            .json()
            .await
            .context("Failed to parse listing response")?;
        Ok(body.files)
    }

    async fn search(&self, text: &str) -> Result<Vec<DriveEntry>> {
        let response = self
            .client
            .get(self.endpoint("/api/v1/drive/search"))
            .query(&[("q", text)])
            .send()
            .await
            .context("Failed to request search")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: FilesBody = response
            .json()
            .await
            .context("Failed to parse search response")?;
        Ok(body.files)
    }

    async fn upload(&self, file_id: &str, property_id: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("/api/v1/drive/upload"))
            .json(&serde_json::json!({
                "fileId": file_id,
                "propertyId": property_id,
            }))
            .send()
            .await
            .context("Failed to request upload")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadBody = response
            .json()
            .await
            .context("Failed to parse upload response")?;
        Ok(body.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let backend = HttpBackend::new("http://127.0.0.1:18080/").unwrap();
        assert_eq!(
            backend.endpoint("/api/v1/drive/list"),
            "http://127.0.0.1:18080/api/v1/drive/list"
        );
    }
}
