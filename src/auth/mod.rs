// 服务账号认证模块

pub mod service_account;

pub use service_account::{ServiceAccountKey, TokenProvider, DRIVE_READONLY_SCOPE};
