// API错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// 统一错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// 错误信息
    pub error: String,
}

/// API错误
///
/// 边界处的所有失败都转换成 `{error: message}` 的统一形态，
/// 调用方永远看不到原始异常
#[derive(Debug)]
pub struct ApiError {
    /// HTTP状态码
    pub status: StatusCode,
    /// 错误信息
    pub message: String,
}

/// API处理器的统一返回类型
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 客户端参数错误（不触达任何外部服务）
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 上游服务失败，携带底层错误信息，不做瞬时/永久分类
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} 保留 context 链，错误信息对排查更有用
        Self::upstream(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
