// 云盘客户端实现

use crate::auth::{ServiceAccountKey, TokenProvider, DRIVE_READONLY_SCOPE};
use crate::drive::types::{dedup_by_id, escape_query, DriveFileList, FOLDER_MIME_TYPE};
use crate::drive::{DriveApi, DriveEntry, DriveFileMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// files 接口地址
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// 列表/搜索只请求这几个字段，减小响应体
const ENTRY_FIELDS: &str = "files(id, name, mimeType, thumbnailLink)";

/// 目录列表单次返回上限
const LIST_PAGE_SIZE: u32 = 100;

/// 搜索结果单次返回上限
const SEARCH_PAGE_SIZE: u32 = 50;

/// 云盘客户端
///
/// 使用服务账号只读访问单个共享云盘，
/// 访问令牌由 TokenProvider 缓存复用
#[derive(Clone)]
pub struct DriveClient {
    /// HTTP客户端
    client: reqwest::Client,
    /// 访问令牌提供者
    token_provider: TokenProvider,
    /// 共享云盘ID
    shared_drive_id: String,
}

impl DriveClient {
    /// 创建新的云盘客户端
    ///
    /// # 参数
    /// * `key` - 服务账号密钥
    /// * `shared_drive_id` - 共享云盘ID，所有浏览/搜索都限定在此范围内
    pub fn new(key: ServiceAccountKey, shared_drive_id: String) -> Result<Self> {
        let token_provider = TokenProvider::new(key, DRIVE_READONLY_SCOPE)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        info!("初始化云盘客户端成功, 共享云盘={}", shared_drive_id);

        Ok(Self {
            client,
            token_provider,
            shared_drive_id,
        })
    }

    /// 目录列表查询串：父目录下未删除的文件夹和图片
    fn build_list_query(folder_id: &str) -> String {
        format!(
            "'{}' in parents and trashed = false and (mimeType = '{}' or mimeType contains 'image/')",
            folder_id, FOLDER_MIME_TYPE
        )
    }

    /// 搜索查询串：全盘范围内名称匹配的未删除图片
    fn build_search_query(text: &str) -> String {
        format!(
            "name contains '{}' and mimeType contains 'image/' and trashed = false",
            escape_query(text)
        )
    }

    /// 执行一次 files.list 查询并按 id 去重
    async fn run_file_query(
        &self,
        q: &str,
        order_by: &str,
        page_size: u32,
    ) -> Result<Vec<DriveEntry>> {
        let token = self.token_provider.access_token().await?;

        let response = self
            .client
            .get(DRIVE_FILES_URL)
            .query(&[
                ("q", q),
                ("fields", ENTRY_FIELDS),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
                ("driveId", self.shared_drive_id.as_str()),
                ("corpora", "drive"),
                ("orderBy", order_by),
                ("pageSize", page_size.to_string().as_str()),
            ])
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to query drive files")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Drive API 请求失败: {} - {}", status, error_text);
        }

        let list: DriveFileList = response
            .json()
            .await
            .context("Failed to parse drive file list")?;

        Ok(dedup_by_id(list.files))
    }

    /// 单个文件的接口地址
    fn file_url(file_id: &str) -> String {
        format!("{}/{}", DRIVE_FILES_URL, urlencoding::encode(file_id))
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveEntry>> {
        info!("获取文件列表: folder={}", folder_id);

        let q = Self::build_list_query(folder_id);
        let entries = self
            .run_file_query(&q, "folder, name", LIST_PAGE_SIZE)
            .await?;

        debug!("获取到 {} 个文件/文件夹", entries.len());
        Ok(entries)
    }

    async fn search_images(&self, text: &str) -> Result<Vec<DriveEntry>> {
        info!("搜索图片: q={}", text);

        let q = Self::build_search_query(text);
        let entries = self
            .run_file_query(&q, "modifiedTime desc", SEARCH_PAGE_SIZE)
            .await?;

        debug!("搜索到 {} 个图片", entries.len());
        Ok(entries)
    }

    async fn file_metadata(&self, file_id: &str) -> Result<DriveFileMeta> {
        debug!("获取文件元数据: file_id={}", file_id);

        let token = self.token_provider.access_token().await?;

        let response = self
            .client
            .get(Self::file_url(file_id))
            .query(&[("fields", "name, mimeType"), ("supportsAllDrives", "true")])
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to fetch file metadata")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("获取文件元数据失败: {} - {}", status, error_text);
        }

        let meta: DriveFileMeta = response
            .json()
            .await
            .context("Failed to parse file metadata")?;
        Ok(meta)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        info!("下载文件内容: file_id={}", file_id);

        let token = self.token_provider.access_token().await?;

        let response = self
            .client
            .get(Self::file_url(file_id))
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to download file content")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("下载文件内容失败: {} - {}", status, error_text);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read file content")?;

        debug!("下载完成, {} 字节", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_list_query() {
        let q = DriveClient::build_list_query("folder123");
        assert!(q.starts_with("'folder123' in parents"));
        assert!(q.contains("trashed = false"));
        assert!(q.contains(FOLDER_MIME_TYPE));
        assert!(q.contains("mimeType contains 'image/'"));
    }

    #[test]
    fn test_build_search_query_escapes_quotes() {
        let q = DriveClient::build_search_query("O'Brien");
        assert!(q.contains("name contains 'O\\'Brien'"));
        assert!(q.contains("mimeType contains 'image/'"));
        assert!(q.contains("trashed = false"));
    }

    #[test]
    fn test_file_url_encodes_id() {
        assert_eq!(
            DriveClient::file_url("abc123"),
            "https://www.googleapis.com/drive/v3/files/abc123"
        );
        // 特殊字符不应直接拼进路径
        assert_eq!(
            DriveClient::file_url("a/b"),
            "https://www.googleapis.com/drive/v3/files/a%2Fb"
        );
    }

    #[test]
    fn test_page_size_limits() {
        assert_eq!(LIST_PAGE_SIZE, 100);
        assert_eq!(SEARCH_PAGE_SIZE, 50);
    }
}
