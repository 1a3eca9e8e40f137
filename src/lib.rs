// Drive Picker Rust Library
// 共享云盘图片选择与转存服务核心库

// 服务账号认证模块
pub mod auth;

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// Web服务器模块
pub mod server;

// 云盘API模块
pub mod drive;

// 对象存储模块
pub mod storage;

// 选择器状态机模块
pub mod picker;

// 导出常用类型
pub use auth::{ServiceAccountKey, TokenProvider};
pub use config::AppConfig;
pub use drive::{DriveApi, DriveClient, DriveEntry, DriveFileMeta, FOLDER_MIME_TYPE};
pub use picker::{Command, Crumb, Event, PickerBackend, PickerDriver, PickerMode, PickerState};
pub use server::{ApiError, ApiResult, AppState};
pub use storage::{StorageApi, StorageClient};
