// 转存API处理器
//
// 把云盘图片的内容复制到对象存储，并返回公开地址。
// 各步骤独立失败并中止后续步骤；写入成功后若再出错，
// 已写入的对象保留原样，不做回滚

use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// 转存请求体
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// 云盘文件ID
    #[serde(rename = "fileId", default)]
    pub file_id: String,
    /// 房源ID
    #[serde(rename = "propertyId", default)]
    pub property_id: String,
}

/// 转存响应
#[derive(Debug, Serialize)]
pub struct UploadData {
    /// 对象的公开访问地址
    pub url: String,
}

/// 构造存储路径
///
/// 时间戳前缀用于避免同名文件反复转存时相互覆盖
fn build_storage_path(property_id: &str, millis: i64, filename: &str) -> String {
    format!("properties/{}/{}-{}", property_id, millis, filename)
}

/// 转存云盘图片到对象存储
///
/// POST /api/v1/drive/upload
/// Body: { "fileId": "...", "propertyId": "..." }
pub async fn upload_file(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadData>> {
    if request.file_id.is_empty() || request.property_id.is_empty() {
        return Err(ApiError::bad_request("Missing fileId or propertyId"));
    }

    info!(
        "API: 转存图片 file_id={}, property_id={}",
        request.file_id, request.property_id
    );

    // 1. 文件元数据（名称/类型缺失时回退图片默认值）
    let meta = match state.drive.file_metadata(&request.file_id).await {
        Ok(meta) => meta,
        Err(e) => {
            error!("获取文件元数据失败: {:#}", e);
            return Err(ApiError::from(e));
        }
    };

    // 2. 文件内容
    let bytes = match state.drive.download(&request.file_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("下载文件内容失败: {:#}", e);
            return Err(ApiError::from(e));
        }
    };

    // 3. 存储路径
    let millis = chrono::Utc::now().timestamp_millis();
    let path = build_storage_path(&request.property_id, millis, meta.filename());

    // 4. 写入对象存储
    if let Err(e) = state
        .storage
        .upload_object(&path, meta.content_type(), bytes)
        .await
    {
        error!("对象写入失败: {:#}", e);
        return Err(ApiError::from(e));
    }

    // 5. 公开地址
    let url = state.storage.public_url(&path);
    info!("转存成功: {}", url);

    Ok(Json(UploadData { url }))
}
