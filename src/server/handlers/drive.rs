// 云盘浏览API处理器

use crate::drive::DriveEntry;
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// 文件列表查询参数
#[derive(Debug, Deserialize)]
pub struct FileListQuery {
    /// 文件夹ID，缺省时使用配置的共享云盘根
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
}

/// 文件列表响应（列表和搜索共用）
#[derive(Debug, Serialize)]
pub struct FileListData {
    /// 条目列表（已按 id 去重）
    pub files: Vec<DriveEntry>,
}

/// 获取文件列表
///
/// GET /api/v1/drive/list?folderId=xxx
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<FileListQuery>,
) -> ApiResult<Json<FileListData>> {
    let folder_id = params
        .folder_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(&state.config.drive.shared_drive_id);

    info!("API: 获取文件列表 folder={}", folder_id);

    match state.drive.list_children(folder_id).await {
        Ok(files) => {
            info!("成功获取 {} 个文件/文件夹", files.len());
            Ok(Json(FileListData { files }))
        }
        Err(e) => {
            error!("获取文件列表失败: {:#}", e);
            Err(ApiError::from(e))
        }
    }
}

/// 搜索查询参数
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// 搜索文本
    pub q: Option<String>,
}

/// 全盘搜索图片
///
/// GET /api/v1/drive/search?q=beach
pub async fn search_files(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<FileListData>> {
    let q = params.q.as_deref().unwrap_or("");
    if q.is_empty() {
        return Err(ApiError::bad_request("Missing search query"));
    }

    info!("API: 搜索图片 q={}", q);

    match state.drive.search_images(q).await {
        Ok(files) => {
            info!("搜索到 {} 个图片", files.len());
            Ok(Json(FileListData { files }))
        }
        Err(e) => {
            error!("搜索图片失败: {:#}", e);
            Err(ApiError::from(e))
        }
    }
}
