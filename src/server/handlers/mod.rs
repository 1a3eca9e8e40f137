// API处理器模块

pub mod drive;
pub mod upload;

pub use drive::{list_files, search_files};
pub use upload::upload_file;
